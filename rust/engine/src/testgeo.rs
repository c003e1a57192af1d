// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory geometry backend for unit tests: tracks visibility and
//! highlights per element and can be scripted to fail specific calls.

use std::cell::{Cell, RefCell};

use heatlens_core::attr::{AttrBag, AttrValue};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::geometry::{GeometryApi, Highlight, LocalRef, ModelId, SPACE_CATEGORY};

#[derive(Debug, Default)]
struct FakeModel {
    /// Category order as a backend would report it.
    categories: Vec<String>,
    elements: FxHashMap<String, Vec<LocalRef>>,
    /// Space elements: (local ref, stable id, name).
    spaces: Vec<(LocalRef, String, String)>,
    visibility: FxHashMap<LocalRef, bool>,
    highlights: FxHashMap<LocalRef, Highlight>,
}

/// Scriptable in-memory [`GeometryApi`] implementation.
#[derive(Debug, Default)]
pub struct FakeGeometry {
    models: RefCell<FxHashMap<ModelId, FakeModel>>,
    fail_ready: Cell<bool>,
    fail_stable_ids: RefCell<FxHashSet<LocalRef>>,
    fail_element_models: RefCell<FxHashSet<ModelId>>,
    fail_categories: RefCell<FxHashSet<(ModelId, String)>>,
    refresh_count: Cell<usize>,
    highlight_count: Cell<usize>,
}

impl FakeGeometry {
    /// One model with the given space elements (ref, stable id, name).
    pub fn single_model(spaces: Vec<(LocalRef, &str, &str)>) -> Self {
        let geometry = Self::default();
        geometry.insert_model(ModelId(1), spaces);
        geometry
    }

    /// Two models, each with its own space elements.
    pub fn two_models(
        first: Vec<(LocalRef, &str, &str)>,
        second: Vec<(LocalRef, &str, &str)>,
    ) -> Self {
        let geometry = Self::default();
        geometry.insert_model(ModelId(1), first);
        geometry.insert_model(ModelId(2), second);
        geometry
    }

    fn insert_model(&self, id: ModelId, spaces: Vec<(LocalRef, &str, &str)>) {
        let mut model = FakeModel::default();
        model.categories.push(SPACE_CATEGORY.to_string());
        let refs: Vec<LocalRef> = spaces.iter().map(|(r, _, _)| *r).collect();
        for &local_ref in &refs {
            model.visibility.insert(local_ref, true);
        }
        model.elements.insert(SPACE_CATEGORY.to_string(), refs);
        model.spaces = spaces
            .into_iter()
            .map(|(r, id, name)| (r, id.to_string(), name.to_string()))
            .collect();
        self.models.borrow_mut().insert(id, model);
    }

    /// Adds a non-space category with the given elements, all visible.
    pub fn add_category(&self, model: ModelId, category: &str, refs: Vec<LocalRef>) {
        let mut models = self.models.borrow_mut();
        let entry = models.entry(model).or_default();
        entry.categories.push(category.to_string());
        for &local_ref in &refs {
            entry.visibility.insert(local_ref, true);
        }
        entry.elements.insert(category.to_string(), refs);
    }

    pub fn model_ids(&self) -> Vec<ModelId> {
        let mut ids: Vec<ModelId> = self.models.borrow().keys().copied().collect();
        ids.sort();
        ids
    }

    // --- fault scripting ---

    pub fn set_ready(&self, ready: bool) {
        self.fail_ready.set(!ready);
    }

    pub fn fail_stable_id(&self, element: LocalRef) {
        self.fail_stable_ids.borrow_mut().insert(element);
    }

    /// Every element enumeration for this model fails.
    pub fn fail_elements(&self, model: ModelId) {
        self.fail_element_models.borrow_mut().insert(model);
    }

    /// Element enumeration for one category of one model fails.
    pub fn fail_category(&self, model: ModelId, category: &str) {
        self.fail_categories
            .borrow_mut()
            .insert((model, category.to_string()));
    }

    // --- observation ---

    pub fn is_visible(&self, model: ModelId, element: LocalRef) -> bool {
        self.models.borrow()[&model]
            .visibility
            .get(&element)
            .copied()
            .unwrap_or(false)
    }

    /// Full visibility map of one model, for bit-for-bit comparisons.
    pub fn visibility_snapshot(&self, model: ModelId) -> FxHashMap<LocalRef, bool> {
        self.models.borrow()[&model].visibility.clone()
    }

    pub fn highlight_of(&self, model: ModelId, element: LocalRef) -> Option<Highlight> {
        self.models.borrow()[&model].highlights.get(&element).copied()
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count.get()
    }

    pub fn highlight_count(&self) -> usize {
        self.highlight_count.get()
    }

    pub fn reset_counters(&self) {
        self.refresh_count.set(0);
        self.highlight_count.set(0);
    }

    fn check_model(&self, model: ModelId) -> Result<()> {
        if self.models.borrow().contains_key(&model) {
            Ok(())
        } else {
            Err(Error::Geometry(format!("unknown model {}", model.0)))
        }
    }
}

impl GeometryApi for FakeGeometry {
    async fn wait_ready(&self) -> Result<()> {
        if self.fail_ready.get() {
            Err(Error::Geometry("backend not ready".into()))
        } else {
            Ok(())
        }
    }

    async fn categories(&self, model: ModelId) -> Result<Vec<String>> {
        self.check_model(model)?;
        Ok(self.models.borrow()[&model].categories.clone())
    }

    async fn elements(&self, model: ModelId, category: &str) -> Result<Vec<LocalRef>> {
        self.check_model(model)?;
        if self.fail_element_models.borrow().contains(&model) {
            return Err(Error::Geometry("element enumeration failed".into()));
        }
        if self
            .fail_categories
            .borrow()
            .contains(&(model, category.to_string()))
        {
            return Err(Error::Geometry(format!("category {category} unavailable")));
        }
        Ok(self.models.borrow()[&model]
            .elements
            .get(category)
            .cloned()
            .unwrap_or_default())
    }

    async fn stable_id(&self, model: ModelId, element: LocalRef) -> Result<String> {
        self.check_model(model)?;
        if self.fail_stable_ids.borrow().contains(&element) {
            return Err(Error::Geometry(format!("no stable id for {}", element.0)));
        }
        self.models.borrow()[&model]
            .spaces
            .iter()
            .find(|(r, _, _)| *r == element)
            .map(|(_, id, _)| id.clone())
            .ok_or_else(|| Error::Geometry(format!("element {} not a space", element.0)))
    }

    async fn attributes(&self, model: ModelId, element: LocalRef) -> Result<AttrBag> {
        self.check_model(model)?;
        let models = self.models.borrow();
        let (_, _, name) = models[&model]
            .spaces
            .iter()
            .find(|(r, _, _)| *r == element)
            .ok_or_else(|| Error::Geometry(format!("element {} not a space", element.0)))?;

        let mut bag = AttrBag::default();
        bag.insert("Name".to_string(), AttrValue::Text(name.clone()));
        Ok(bag)
    }

    async fn set_visibility(
        &self,
        model: ModelId,
        elements: &[LocalRef],
        visible: bool,
    ) -> Result<()> {
        self.check_model(model)?;
        let mut models = self.models.borrow_mut();
        let entry = models.get_mut(&model).unwrap();
        for &local_ref in elements {
            entry.visibility.insert(local_ref, visible);
        }
        Ok(())
    }

    async fn highlight(
        &self,
        model: ModelId,
        elements: &[LocalRef],
        highlight: &Highlight,
    ) -> Result<()> {
        self.check_model(model)?;
        let mut models = self.models.borrow_mut();
        let entry = models.get_mut(&model).unwrap();
        for &local_ref in elements {
            entry.highlights.insert(local_ref, *highlight);
        }
        self.highlight_count.set(self.highlight_count.get() + 1);
        Ok(())
    }

    async fn clear_highlight(&self, model: ModelId, elements: &[LocalRef]) -> Result<()> {
        self.check_model(model)?;
        let mut models = self.models.borrow_mut();
        let entry = models.get_mut(&model).unwrap();
        for local_ref in elements {
            entry.highlights.remove(local_ref);
        }
        Ok(())
    }

    async fn refresh(&self, model: ModelId) -> Result<()> {
        self.check_model(model)?;
        self.refresh_count.set(self.refresh_count.get() + 1);
        Ok(())
    }
}
