use indexmap::IndexMap;

use super::{Element, Relationship};

/// One named partition of the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub elements: Vec<Element>,
    pub relationships: Vec<Relationship>,
}

impl Layer {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            elements: Vec::new(),
            relationships: Vec::new(),
        }
    }
}

/// Parsed model snapshot handed to the graph pipeline.
///
/// A `MetaModel` is a plain value. The pipeline reads it and never keeps a
/// reference to it past the call that consumed it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaModel {
    pub layers: IndexMap<String, Layer>,
    /// Relationships declared outside any layer, typically crossing layers.
    pub references: Vec<Relationship>,
}

impl MetaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer, replacing any layer with the same id.
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.insert(layer.id.clone(), layer);
        self
    }

    /// All elements in layer order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.layers.values().flat_map(|layer| layer.elements.iter())
    }

    /// All layer relationships in layer order. References are not included.
    pub fn layer_relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.layers
            .values()
            .flat_map(|layer| layer.relationships.iter())
    }

    /// Layer relationships followed by model references.
    pub fn all_relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.layer_relationships().chain(self.references.iter())
    }

    pub fn element_count(&self) -> usize {
        self.layers.values().map(|layer| layer.elements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.references.is_empty()
    }
}
