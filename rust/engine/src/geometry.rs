// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The consumed geometry-backend interface.
//!
//! The engine is generic over [`GeometryApi`], the narrow slice of a 3D
//! engine it needs: category/element enumeration, stable identifiers,
//! attribute bags, visibility, highlights, and a per-model refresh. Every
//! method is async — calls into a real backend have highly variable
//! latency and the engine treats each one as a suspension point.

use heatlens_core::attr::AttrBag;
use heatlens_core::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Category name of space elements in loaded models.
pub const SPACE_CATEGORY: &str = "IfcSpace";

/// Opaque handle to one loaded model. Valid for the load session only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub u32);

/// Session-scoped reference to one element within one loaded model.
/// Not stable across reloads; stable identity comes from
/// [`GeometryApi::stable_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalRef(pub u32);

/// How highlighted faces are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceStyle {
    Shaded,
    Wireframe,
}

/// A highlight applied to a set of elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub color: Rgba,
    /// Opacity in `[0,1]`.
    pub opacity: f32,
    /// Whether the highlighted surface renders transparent.
    pub transparent: bool,
    pub face_style: FaceStyle,
}

impl Highlight {
    /// A shaded, transparent highlight — the overlay default.
    pub fn overlay(color: Rgba, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            transparent: true,
            face_style: FaceStyle::Shaded,
        }
    }
}

/// The slice of a 3D geometry engine consumed by the overlay.
///
/// Implementations may reject any call; the engine recovers locally
/// (skip-and-log) everywhere except readiness checks during activation.
pub trait GeometryApi {
    /// Resolves once the backend has finished loading and is safe to
    /// query. Replaces guessed-delay retry polling with an explicit
    /// readiness signal.
    fn wait_ready(&self) -> impl std::future::Future<Output = Result<()>>;

    /// Enumerates the element categories present in a model.
    fn categories(&self, model: ModelId) -> impl std::future::Future<Output = Result<Vec<String>>>;

    /// Enumerates the elements of one category.
    fn elements(
        &self,
        model: ModelId,
        category: &str,
    ) -> impl std::future::Future<Output = Result<Vec<LocalRef>>>;

    /// Returns an element's stable identifier.
    fn stable_id(
        &self,
        model: ModelId,
        element: LocalRef,
    ) -> impl std::future::Future<Output = Result<String>>;

    /// Returns an element's attributes, decoded into a normalized bag.
    fn attributes(
        &self,
        model: ModelId,
        element: LocalRef,
    ) -> impl std::future::Future<Output = Result<AttrBag>>;

    /// Sets visibility for a set of elements.
    fn set_visibility(
        &self,
        model: ModelId,
        elements: &[LocalRef],
        visible: bool,
    ) -> impl std::future::Future<Output = Result<()>>;

    /// Applies a highlight to a set of elements.
    fn highlight(
        &self,
        model: ModelId,
        elements: &[LocalRef],
        highlight: &Highlight,
    ) -> impl std::future::Future<Output = Result<()>>;

    /// Removes any highlight from a set of elements.
    fn clear_highlight(
        &self,
        model: ModelId,
        elements: &[LocalRef],
    ) -> impl std::future::Future<Output = Result<()>>;

    /// Forces a visual refresh of one model. The engine batches visibility
    /// and highlight changes and calls this once per model touched.
    fn refresh(&self, model: ModelId) -> impl std::future::Future<Output = Result<()>>;
}

/// Shared backend handles work too: callers often hold the backend in an
/// `Rc` alongside scene plumbing.
impl<G: GeometryApi> GeometryApi for std::rc::Rc<G> {
    async fn wait_ready(&self) -> Result<()> {
        (**self).wait_ready().await
    }

    async fn categories(&self, model: ModelId) -> Result<Vec<String>> {
        (**self).categories(model).await
    }

    async fn elements(&self, model: ModelId, category: &str) -> Result<Vec<LocalRef>> {
        (**self).elements(model, category).await
    }

    async fn stable_id(&self, model: ModelId, element: LocalRef) -> Result<String> {
        (**self).stable_id(model, element).await
    }

    async fn attributes(&self, model: ModelId, element: LocalRef) -> Result<AttrBag> {
        (**self).attributes(model, element).await
    }

    async fn set_visibility(
        &self,
        model: ModelId,
        elements: &[LocalRef],
        visible: bool,
    ) -> Result<()> {
        (**self).set_visibility(model, elements, visible).await
    }

    async fn highlight(
        &self,
        model: ModelId,
        elements: &[LocalRef],
        highlight: &Highlight,
    ) -> Result<()> {
        (**self).highlight(model, elements, highlight).await
    }

    async fn clear_highlight(&self, model: ModelId, elements: &[LocalRef]) -> Result<()> {
        (**self).clear_highlight(model, elements).await
    }

    async fn refresh(&self, model: ModelId) -> Result<()> {
        (**self).refresh(model).await
    }
}
