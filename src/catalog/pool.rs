use super::{AddError, CatalogError, Category, EntityKind, Face, PoolId};
use crate::naming;
use crate::order::{self, OrderPolicy};

/// Top-level collection of categories: a face gallery.
///
/// A pool may be unnamed. Only named pools become the *source* pool of the
/// faces added through them (see [`Face::source_pool_id`]).
#[derive(Debug)]
pub struct Pool {
    id: PoolId,
    name: Option<String>,
    description: Vec<String>,
    credits: Vec<String>,
    categories: Vec<Category>,
    insertion: Vec<String>,
    dirty: bool,
    policy: OrderPolicy,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// An unnamed pool.
    pub fn new() -> Self {
        Self::with_policy(None, OrderPolicy::default())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::with_policy(Some(name.into()), OrderPolicy::default())
    }

    pub fn with_policy(name: Option<String>, policy: OrderPolicy) -> Self {
        Self {
            id: PoolId::next(),
            name,
            description: Vec::new(),
            credits: Vec::new(),
            categories: Vec::new(),
            insertion: Vec::new(),
            dirty: false,
            policy,
        }
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Source-pool links follow identity, not name: renaming never moves
    /// them. Naming an unnamed pool makes it the source pool of every face
    /// that has none yet, and of faces added later.
    pub fn set_name(&mut self, name: Option<String>) {
        let named = name.is_some();
        self.name = name;
        for category in &mut self.categories {
            category.set_pool_named(named);
        }
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    pub fn set_description(&mut self, description: Vec<String>) {
        self.description = description;
    }

    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }

    pub fn credits(&self) -> &[String] {
        &self.credits
    }

    pub fn set_credits(&mut self, credits: Vec<String>) {
        self.credits = credits;
    }

    pub fn has_credits(&self) -> bool {
        !self.credits.is_empty()
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    /// Whether [`Pool::sort_if_needed`] has work to do, here or in any category.
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.categories.iter().any(Category::is_dirty)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of faces across all categories.
    pub fn face_count(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name() == name)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name() == name)
    }

    /// Mutable access to one category. Marks the pool dirty, since the
    /// caller may change the category's order.
    pub fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        let idx = self.position(name)?;
        self.dirty = true;
        Some(&mut self.categories[idx])
    }

    /// Categories in display order, each with its faces sorted.
    pub fn categories(&mut self) -> &[Category] {
        self.sort_if_needed();
        &self.categories
    }

    /// Categories in storage order.
    pub fn categories_unsorted(&self) -> &[Category] {
        &self.categories
    }

    pub(crate) fn categories_for_io(&mut self) -> &mut [Category] {
        self.sort_if_needed();
        &mut self.categories
    }

    /// Look up a face by `<category>/<face>` path.
    pub fn face(&self, path: &str) -> Result<Option<&Face>, CatalogError> {
        let (category, face) = naming::split_face_path(path)
            .ok_or_else(|| CatalogError::InvalidPath(path.to_string()))?;
        Ok(self.category(category).and_then(|c| c.face(face)))
    }

    /// Mutable face lookup by path. Marks the owning category dirty.
    pub fn face_mut(&mut self, path: &str) -> Result<Option<&mut Face>, CatalogError> {
        let (category, face) = naming::split_face_path(path)
            .ok_or_else(|| CatalogError::InvalidPath(path.to_string()))?;
        let Some(idx) = self.position(category) else {
            return Ok(None);
        };
        Ok(self.categories[idx].face_mut(face))
    }

    /// Effective character name of the face at `path`.
    pub fn character_name_of(&self, path: &str) -> Result<Option<&str>, CatalogError> {
        let (category, face) = naming::split_face_path(path)
            .ok_or_else(|| CatalogError::InvalidPath(path.to_string()))?;
        Ok(self
            .category(category)
            .and_then(|c| c.face(face).map(|f| c.character_name_of(f))))
    }

    /// Add a detached category, cascading the pool link to its faces.
    pub fn add(&mut self, mut category: Category) -> Result<(), AddError<Category>> {
        if category.is_attached() {
            let error = CatalogError::AlreadyOwned {
                kind: EntityKind::Category,
                name: category.name().to_string(),
            };
            return Err(AddError { error, rejected: category });
        }
        if self.contains(category.name()) {
            let error = CatalogError::DuplicateName {
                kind: EntityKind::Category,
                name: category.name().to_string(),
            };
            return Err(AddError { error, rejected: category });
        }

        if category.order().is_none()
            && let Some(cursor) = self.cursor()
        {
            category.set_order(self.policy.next_order(order::effective_order(cursor.order())));
        }

        category.attach_pool(self.id, self.name.is_some());
        self.insertion.push(category.name().to_string());
        self.categories.push(category);
        self.dirty = true;
        Ok(())
    }

    fn cursor(&self) -> Option<&Category> {
        self.insertion.last().and_then(|name| self.category(name))
    }

    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<(), CatalogError> {
        let idx = self.position(name).ok_or_else(|| CatalogError::NotFound {
            kind: EntityKind::Category,
            name: name.to_string(),
        })?;
        if name == new_name {
            return Ok(());
        }
        if self.contains(new_name) {
            return Err(CatalogError::DuplicateName {
                kind: EntityKind::Category,
                name: new_name.to_string(),
            });
        }

        self.categories[idx].set_name(new_name.to_string());
        if let Some(entry) = self.insertion.iter_mut().find(|n| *n == name) {
            *entry = new_name.to_string();
        }
        self.dirty = true;
        Ok(())
    }

    /// Detach and return a category; its faces lose their pool link.
    pub fn remove(&mut self, name: &str) -> Option<Category> {
        let idx = self.position(name)?;
        let mut category = self.categories.remove(idx);
        self.insertion.retain(|n| n != name);
        category.detach_pool();
        self.dirty = true;
        Some(category)
    }

    /// Detach every category. Leaves the pool clean: nothing to sort.
    pub fn clear(&mut self) {
        for category in &mut self.categories {
            category.detach_pool();
        }
        self.categories.clear();
        self.insertion.clear();
        self.dirty = false;
    }

    /// Sort categories (and each category's faces) if stale. Returns whether
    /// any sort happened.
    pub fn sort_if_needed(&mut self) -> bool {
        let mut sorted = false;
        if self.dirty {
            self.categories
                .sort_by(|a, b| order::compare(a.order(), a.name(), b.order(), b.name()));
            self.dirty = false;
            sorted = true;
        }
        for category in &mut self.categories {
            sorted |= category.sort_if_needed();
        }
        sorted
    }
}
