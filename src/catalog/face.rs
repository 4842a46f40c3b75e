use super::{CategoryId, PoolId};
use crate::naming;
use image::DynamicImage;
use std::sync::OnceLock;

/// A single named visual asset backed by one image file.
///
/// The name is the identity key within a category and can only change
/// through [`Category::rename`](super::Category::rename) (or
/// [`Face::renamed`] while detached), so the owning map never goes stale.
#[derive(Debug, Clone)]
pub struct Face {
    name: String,
    image_path: String,
    order: Option<i64>,
    character_name: Option<String>,
    description: Option<Vec<String>>,
    image: Option<DynamicImage>,
    category: Option<CategoryId>,
    pool: Option<PoolId>,
    source_pool: Option<PoolId>,
    /// Memoized [`naming::derive_character_name`]; reset on rename.
    derived_character_name: OnceLock<String>,
}

impl Face {
    pub fn new(name: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_path: image_path.into(),
            order: None,
            character_name: None,
            description: None,
            image: None,
            category: None,
            pool: None,
            source_pool: None,
            derived_character_name: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same face under a new name. Only reachable for owned values, so an
    /// attached face (borrowed out of its category) cannot be re-keyed here.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.set_name(name.into());
        self
    }

    pub(super) fn set_name(&mut self, name: String) {
        self.name = name;
        self.derived_character_name = OnceLock::new();
    }

    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    pub fn set_image_path(&mut self, image_path: impl Into<String>) {
        self.image_path = image_path.into();
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

    /// Explicitly set character name, if any.
    pub fn character_name(&self) -> Option<&str> {
        self.character_name.as_deref()
    }

    pub fn set_character_name(&mut self, character_name: impl Into<String>) {
        self.character_name = Some(character_name.into());
    }

    pub fn clear_character_name(&mut self) {
        self.character_name = None;
    }

    /// Character name derived from the face name (text before the first comma).
    pub fn derived_character_name(&self) -> &str {
        self.derived_character_name
            .get_or_init(|| naming::derive_character_name(&self.name).to_string())
    }

    /// Explicit character name, else the derived one. Ignores the category;
    /// see [`Category::character_name_of`](super::Category::character_name_of).
    pub fn resolved_character_name(&self) -> &str {
        self.character_name()
            .unwrap_or_else(|| self.derived_character_name())
    }

    pub fn description(&self) -> &[String] {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn has_description(&self) -> bool {
        self.description.as_ref().is_some_and(|d| !d.is_empty())
    }

    /// Mutable description lines, created empty on first access.
    pub fn description_mut(&mut self) -> &mut Vec<String> {
        self.description.get_or_insert_with(Vec::new)
    }

    pub fn clear_description(&mut self) {
        self.description = None;
    }

    /// Decoded image payload, present after a bulk read (or [`Face::set_image`]).
    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, image: DynamicImage) {
        self.image = Some(image);
    }

    pub fn take_image(&mut self) -> Option<DynamicImage> {
        self.image.take()
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category
    }

    /// Pool the face is currently reachable through.
    pub fn pool_id(&self) -> Option<PoolId> {
        self.pool
    }

    /// Named pool the face was first attached through. Survives
    /// [`Face::detached_copy`], so a face shared into another pool remembers
    /// where it came from.
    pub fn source_pool_id(&self) -> Option<PoolId> {
        self.source_pool
    }

    pub fn is_attached(&self) -> bool {
        self.category.is_some()
    }

    /// Copy with every ownership link cleared except the source pool.
    pub fn detached_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.category = None;
        copy.pool = None;
        copy
    }

    pub(super) fn attach(&mut self, category: CategoryId, pool: Option<(PoolId, bool)>) {
        self.category = Some(category);
        if let Some((pool, named)) = pool {
            self.attach_pool(pool, named);
        }
    }

    pub(super) fn detach(&mut self) {
        self.detach_pool();
        self.category = None;
    }

    pub(super) fn attach_pool(&mut self, pool: PoolId, named: bool) {
        if named {
            self.source_pool = Some(pool);
        }
        self.pool = Some(pool);
    }

    /// Record `pool` as the source pool unless one is already set.
    pub(super) fn adopt_source_pool(&mut self, pool: PoolId) {
        if self.source_pool.is_none() {
            self.source_pool = Some(pool);
        }
    }

    pub(super) fn detach_pool(&mut self) {
        if self.source_pool.is_some() && self.source_pool == self.pool {
            self.source_pool = None;
        }
        self.pool = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_face_is_detached_and_unset() {
        let face = Face::new("Niko, happy", "niko/happy.png");
        assert_eq!(face.name(), "Niko, happy");
        assert_eq!(face.image_path(), "niko/happy.png");
        assert_eq!(face.order(), None);
        assert_eq!(face.character_name(), None);
        assert!(!face.has_description());
        assert!(face.image().is_none());
        assert!(!face.is_attached());
    }

    #[test]
    fn derived_character_name_from_name() {
        let face = Face::new("Niko, happy", "a.png");
        assert_eq!(face.derived_character_name(), "Niko");
        assert_eq!(face.resolved_character_name(), "Niko");
    }

    #[test]
    fn explicit_character_name_wins() {
        let mut face = Face::new("Niko, happy", "a.png");
        face.set_character_name("The Messiah");
        assert_eq!(face.resolved_character_name(), "The Messiah");
        face.clear_character_name();
        assert_eq!(face.resolved_character_name(), "Niko");
    }

    #[test]
    fn rename_invalidates_derived_character_name() {
        let face = Face::new("Niko, happy", "a.png");
        assert_eq!(face.derived_character_name(), "Niko");
        let face = face.renamed("Alula, smile");
        assert_eq!(face.derived_character_name(), "Alula");
    }

    #[test]
    fn description_created_on_demand() {
        let mut face = Face::new("Niko", "a.png");
        assert!(face.description().is_empty());
        face.description_mut().push("Main character".to_string());
        assert!(face.has_description());
        assert_eq!(face.description(), ["Main character"]);
        face.clear_description();
        assert!(!face.has_description());
    }

    #[test]
    fn empty_description_is_not_a_description() {
        let mut face = Face::new("Niko", "a.png");
        face.description_mut();
        assert!(!face.has_description());
    }

    #[test]
    fn detached_copy_keeps_source_pool_only() {
        let mut face = Face::new("Niko", "a.png");
        let category = CategoryId::next();
        let pool = PoolId::next();
        face.attach(category, Some((pool, true)));
        assert!(face.is_attached());

        let copy = face.detached_copy();
        assert!(!copy.is_attached());
        assert_eq!(copy.pool_id(), None);
        assert_eq!(copy.source_pool_id(), Some(pool));
    }

    #[test]
    fn unnamed_pool_is_not_a_source() {
        let mut face = Face::new("Niko", "a.png");
        face.attach(CategoryId::next(), Some((PoolId::next(), false)));
        assert!(face.pool_id().is_some());
        assert_eq!(face.source_pool_id(), None);
    }

    #[test]
    fn leaving_source_pool_clears_it() {
        let mut face = Face::new("Niko", "a.png");
        let pool = PoolId::next();
        face.attach(CategoryId::next(), Some((pool, true)));
        face.detach();
        assert_eq!(face.pool_id(), None);
        assert_eq!(face.source_pool_id(), None);
    }

    #[test]
    fn leaving_other_pool_keeps_source() {
        let source = PoolId::next();
        let mut face = Face::new("Niko", "a.png");
        face.attach(CategoryId::next(), Some((source, true)));
        let mut shared = face.detached_copy();
        shared.attach(CategoryId::next(), Some((PoolId::next(), false)));
        shared.detach();
        assert_eq!(shared.source_pool_id(), Some(source));
    }
}
