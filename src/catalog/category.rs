use super::{AddError, CatalogError, CategoryId, EntityKind, Face, PoolId};
use crate::order::{self, OrderPolicy};

/// A named group of faces sharing a default character name.
#[derive(Debug)]
pub struct Category {
    id: CategoryId,
    name: String,
    order: Option<i64>,
    character_name: Option<String>,
    description: Vec<String>,
    /// Display order once sorted; insertion order until then.
    faces: Vec<Face>,
    /// Face names in insertion order. The last entry is the default-order cursor.
    insertion: Vec<String>,
    pool: Option<(PoolId, bool)>,
    dirty: bool,
    policy: OrderPolicy,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_policy(name, OrderPolicy::default())
    }

    pub fn with_policy(name: impl Into<String>, policy: OrderPolicy) -> Self {
        Self {
            id: CategoryId::next(),
            name: name.into(),
            order: None,
            character_name: None,
            description: Vec::new(),
            faces: Vec::new(),
            insertion: Vec::new(),
            pool: None,
            dirty: false,
            policy,
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same category under a new name; see [`Face::renamed`].
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub(super) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn order(&self) -> Option<i64> {
        self.order
    }

    pub fn set_order(&mut self, order: i64) {
        self.order = Some(order);
    }

    pub fn clear_order(&mut self) {
        self.order = None;
    }

    pub fn character_name(&self) -> Option<&str> {
        self.character_name.as_deref()
    }

    pub fn set_character_name(&mut self, character_name: impl Into<String>) {
        self.character_name = Some(character_name.into());
    }

    pub fn clear_character_name(&mut self) {
        self.character_name = None;
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }

    pub fn set_description(&mut self, description: Vec<String>) {
        self.description = description;
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    pub fn pool_id(&self) -> Option<PoolId> {
        self.pool.map(|(id, _)| id)
    }

    pub fn is_attached(&self) -> bool {
        self.pool.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.faces.iter().position(|f| f.name() == name)
    }

    pub fn face(&self, name: &str) -> Option<&Face> {
        self.faces.iter().find(|f| f.name() == name)
    }

    /// Mutable access to one face. Marks the category dirty, since the
    /// caller may change the face's order.
    pub fn face_mut(&mut self, name: &str) -> Option<&mut Face> {
        let idx = self.position(name)?;
        self.dirty = true;
        Some(&mut self.faces[idx])
    }

    /// Faces in display order.
    pub fn faces(&mut self) -> &[Face] {
        self.sort_if_needed();
        &self.faces
    }

    /// Faces in storage order, which is display order unless [`Category::is_dirty`].
    pub fn faces_unsorted(&self) -> &[Face] {
        &self.faces
    }

    /// Sorted faces for the bulk image orchestrator, which only touches payloads.
    pub(crate) fn faces_for_io(&mut self) -> &mut [Face] {
        self.sort_if_needed();
        &mut self.faces
    }

    /// Effective character name of `face`: its own, else this category's
    /// (when the face belongs here), else derived from the face name.
    pub fn character_name_of<'a>(&'a self, face: &'a Face) -> &'a str {
        face.character_name()
            .or_else(|| {
                (face.category_id() == Some(self.id))
                    .then_some(self.character_name.as_deref())
                    .flatten()
            })
            .unwrap_or_else(|| face.derived_character_name())
    }

    /// Add a detached face. Assigns a default order after the last added
    /// face when the new one has none.
    pub fn add(&mut self, mut face: Face) -> Result<(), AddError<Face>> {
        if face.is_attached() {
            let error = CatalogError::AlreadyOwned {
                kind: EntityKind::Face,
                name: face.name().to_string(),
            };
            return Err(AddError { error, rejected: face });
        }
        if self.contains(face.name()) {
            let error = CatalogError::DuplicateName {
                kind: EntityKind::Face,
                name: face.name().to_string(),
            };
            return Err(AddError { error, rejected: face });
        }

        if face.order().is_none()
            && let Some(cursor) = self.cursor()
        {
            face.set_order(self.policy.next_order(order::effective_order(cursor.order())));
        }

        face.attach(self.id, self.pool);
        self.insertion.push(face.name().to_string());
        self.faces.push(face);
        self.dirty = true;
        Ok(())
    }

    fn cursor(&self) -> Option<&Face> {
        self.insertion.last().and_then(|name| self.face(name))
    }

    /// Re-key a face. Renaming to the current name is a no-op.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<(), CatalogError> {
        let idx = self.position(name).ok_or_else(|| CatalogError::NotFound {
            kind: EntityKind::Face,
            name: name.to_string(),
        })?;
        if name == new_name {
            return Ok(());
        }
        if self.contains(new_name) {
            return Err(CatalogError::DuplicateName {
                kind: EntityKind::Face,
                name: new_name.to_string(),
            });
        }

        self.faces[idx].set_name(new_name.to_string());
        if let Some(entry) = self.insertion.iter_mut().find(|n| *n == name) {
            *entry = new_name.to_string();
        }
        self.dirty = true;
        Ok(())
    }

    /// Detach and return a face. The cursor falls back to the last remaining
    /// face in insertion order.
    pub fn remove(&mut self, name: &str) -> Option<Face> {
        let idx = self.position(name)?;
        let mut face = self.faces.remove(idx);
        self.insertion.retain(|n| n != name);
        face.detach();
        self.dirty = true;
        Some(face)
    }

    /// Sort faces if the order is stale. Returns whether a sort happened.
    pub fn sort_if_needed(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.faces
            .sort_by(|a, b| order::compare(a.order(), a.name(), b.order(), b.name()));
        self.dirty = false;
        true
    }

    /// Copy under a fresh identity with no pool; faces are re-pointed at the copy.
    pub fn detached_copy(&self) -> Self {
        let id = CategoryId::next();
        let faces = self
            .faces
            .iter()
            .map(|f| {
                let mut copy = f.detached_copy();
                copy.attach(id, None);
                copy
            })
            .collect();
        Self {
            id,
            name: self.name.clone(),
            order: self.order,
            character_name: self.character_name.clone(),
            description: self.description.clone(),
            faces,
            insertion: self.insertion.clone(),
            pool: None,
            dirty: self.dirty,
            policy: self.policy,
        }
    }

    pub(super) fn attach_pool(&mut self, pool: PoolId, named: bool) {
        self.pool = Some((pool, named));
        for face in &mut self.faces {
            face.attach_pool(pool, named);
        }
    }

    pub(super) fn set_pool_named(&mut self, named: bool) {
        let Some((pool, _)) = self.pool else {
            return;
        };
        self.pool = Some((pool, named));
        if named {
            for face in &mut self.faces {
                face.adopt_source_pool(pool);
            }
        }
    }

    pub(super) fn detach_pool(&mut self) {
        self.pool = None;
        for face in &mut self.faces {
            face.detach_pool();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(category: &mut Category) -> Vec<String> {
        category
            .faces()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    #[test]
    fn add_sets_back_reference() {
        let mut category = Category::new("Niko");
        category.add(Face::new("Niko, happy", "a.png")).unwrap();
        let face = category.face("Niko, happy").unwrap();
        assert_eq!(face.category_id(), Some(category.id()));
        assert!(category.is_dirty());
    }

    #[test]
    fn add_duplicate_fails_and_leaves_category_unchanged() {
        let mut category = Category::new("Niko");
        category.add(Face::new("Niko", "a.png")).unwrap();
        category.sort_if_needed();

        let err = category.add(Face::new("Niko", "b.png")).unwrap_err();
        assert_eq!(
            err.error,
            CatalogError::DuplicateName {
                kind: EntityKind::Face,
                name: "Niko".into()
            }
        );
        assert_eq!(err.into_inner().image_path(), "b.png");
        assert_eq!(category.len(), 1);
        assert_eq!(category.face("Niko").unwrap().image_path(), "a.png");
        assert!(!category.is_dirty());
    }

    #[test]
    fn add_clone_of_attached_face_fails() {
        let mut first = Category::new("A");
        first.add(Face::new("Niko", "a.png")).unwrap();
        let clone = first.face("Niko").unwrap().clone();

        let mut second = Category::new("B");
        let err = second.add(clone).unwrap_err();
        assert!(matches!(err.error, CatalogError::AlreadyOwned { .. }));
        assert!(second.is_empty());

        let copy = first.face("Niko").unwrap().detached_copy();
        second.add(copy).unwrap();
        assert_eq!(second.face("Niko").unwrap().category_id(), Some(second.id()));
    }

    #[test]
    fn default_orders_follow_cursor() {
        let mut category = Category::new("Niko");
        category.add(Face::new("a", "a.png")).unwrap();
        category.add(Face::new("b", "b.png")).unwrap();
        category.add(Face::new("c", "c.png")).unwrap();
        assert_eq!(category.face("a").unwrap().order(), None);
        assert_eq!(category.face("b").unwrap().order(), Some(1000));
        assert_eq!(category.face("c").unwrap().order(), Some(2000));
    }

    #[test]
    fn sort_by_order_then_name() {
        let mut category = Category::new("Niko");
        let mut late = Face::new("a-late", "1.png");
        late.set_order(5000);
        let mut tie_b = Face::new("tie-b", "2.png");
        tie_b.set_order(10);
        let mut tie_a = Face::new("tie-a", "3.png");
        tie_a.set_order(10);
        category.add(late).unwrap();
        category.add(tie_b).unwrap();
        category.add(tie_a).unwrap();

        assert_eq!(names(&mut category), ["tie-a", "tie-b", "a-late"]);
    }

    #[test]
    fn face_mut_marks_dirty_and_resorts() {
        let mut category = Category::new("Niko");
        category.add(Face::new("a", "a.png")).unwrap();
        category.add(Face::new("b", "b.png")).unwrap();
        assert_eq!(names(&mut category), ["a", "b"]);

        category.face_mut("a").unwrap().set_order(9000);
        assert!(category.is_dirty());
        assert_eq!(names(&mut category), ["b", "a"]);
    }

    #[test]
    fn rename_rekeys_and_updates_character_name() {
        let mut category = Category::new("Niko");
        category.add(Face::new("Niko, happy", "a.png")).unwrap();
        assert_eq!(
            category.face("Niko, happy").unwrap().derived_character_name(),
            "Niko"
        );

        category.rename("Niko, happy", "Alula, happy").unwrap();
        assert!(!category.contains("Niko, happy"));
        let face = category.face("Alula, happy").unwrap();
        assert_eq!(face.derived_character_name(), "Alula");
    }

    #[test]
    fn rename_collision_fails() {
        let mut category = Category::new("Niko");
        category.add(Face::new("a", "a.png")).unwrap();
        category.add(Face::new("b", "b.png")).unwrap();
        let err = category.rename("a", "b").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName { .. }));
        assert!(category.contains("a"));
        assert!(category.contains("b"));
    }

    #[test]
    fn rename_to_same_name_is_noop() {
        let mut category = Category::new("Niko");
        category.add(Face::new("a", "a.png")).unwrap();
        category.rename("a", "a").unwrap();
        assert!(category.contains("a"));
    }

    #[test]
    fn rename_missing_face() {
        let mut category = Category::new("Niko");
        assert!(matches!(
            category.rename("nope", "x"),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn renamed_cursor_still_seeds_orders() {
        let mut category = Category::new("Niko");
        let mut first = Face::new("a", "a.png");
        first.set_order(3000);
        category.add(first).unwrap();
        category.rename("a", "z").unwrap();
        category.add(Face::new("b", "b.png")).unwrap();
        assert_eq!(category.face("b").unwrap().order(), Some(4000));
    }

    #[test]
    fn remove_detaches_and_recomputes_cursor() {
        let mut category = Category::new("Niko");
        category.add(Face::new("a", "a.png")).unwrap();
        category.add(Face::new("b", "b.png")).unwrap();
        let mut c = Face::new("c", "c.png");
        c.set_order(7000);
        category.add(c).unwrap();

        let removed = category.remove("c").unwrap();
        assert!(!removed.is_attached());

        // cursor is now "b" (order 1000), by insertion order
        category.add(Face::new("d", "d.png")).unwrap();
        assert_eq!(category.face("d").unwrap().order(), Some(2000));
    }

    #[test]
    fn remove_last_face_clears_cursor() {
        let mut category = Category::new("Niko");
        category.add(Face::new("a", "a.png")).unwrap();
        category.remove("a").unwrap();
        category.add(Face::new("b", "b.png")).unwrap();
        assert_eq!(category.face("b").unwrap().order(), None);
    }

    #[test]
    fn remove_missing_returns_none() {
        let mut category = Category::new("Niko");
        assert!(category.remove("nope").is_none());
    }

    #[test]
    fn character_name_fallback_chain() {
        let mut category = Category::new("Niko");
        category.add(Face::new("Niko, happy", "a.png")).unwrap();
        let mut explicit = Face::new("Niko, sad", "b.png");
        explicit.set_character_name("Someone");
        category.add(explicit).unwrap();

        let derived = category.face("Niko, happy").unwrap();
        assert_eq!(category.character_name_of(derived), "Niko");

        category.set_character_name("The Messiah");
        let inherited = category.face("Niko, happy").unwrap();
        assert_eq!(category.character_name_of(inherited), "The Messiah");
        let own = category.face("Niko, sad").unwrap();
        assert_eq!(category.character_name_of(own), "Someone");
    }

    #[test]
    fn sort_if_needed_is_idempotent() {
        let mut category = Category::new("Niko");
        category.add(Face::new("b", "b.png")).unwrap();
        category.add(Face::new("a", "a.png")).unwrap();
        assert!(category.sort_if_needed());
        let first = names(&mut category);
        assert!(!category.sort_if_needed());
        assert_eq!(names(&mut category), first);
    }

    #[test]
    fn detached_copy_repoints_faces() {
        let mut category = Category::new("Niko");
        category.add(Face::new("a", "a.png")).unwrap();
        let copy = category.detached_copy();
        assert_ne!(copy.id(), category.id());
        assert_eq!(copy.face("a").unwrap().category_id(), Some(copy.id()));
    }
}
