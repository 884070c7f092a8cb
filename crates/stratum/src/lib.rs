//! Stratum - layered architecture models as graphs and 2-D layouts.
//!
//! A model document goes through five stages:
//!
//! 1. [`stratum_parser`] turns raw layers into a typed [`MetaModel`].
//! 2. [`graph::GraphBuilder`] builds a validated graph with hierarchy,
//!    metrics and indices.
//! 3. [`resolve::CrossLayerReferenceResolver`] bundles relationships whose
//!    endpoints live in different layers.
//! 4. [`transform::NodeTransformer`] sizes the nodes and merges edges into a
//!    render graph.
//! 5. A [`layout::LayoutEngine`] from the [`layout::LayoutEngineRegistry`]
//!    positions nodes and routes edges.
//!
//! [`Pipeline`] runs all of them. Data-quality problems never abort a run;
//! they are collected as [`Diagnostic`] warnings.

pub mod config;
pub mod graph;
pub mod layout;
pub mod resolve;
pub mod transform;

mod error;

pub use stratum_core::{diagnostic, geometry, model};
pub use stratum_parser::{ParseError, ParsedModel, ParserConfig, RawModel};

pub use error::StratumError;

use log::{debug, info, warn};
use serde::Serialize;

use stratum_core::{
    diagnostic::{Diagnostic, ErrorCode, ValidationReport},
    model::{Element, MetaModel, Relationship},
};

use config::AppConfig;
use graph::{Graph, GraphBuilder, validate_relationships};
use layout::{DEFAULT_ALGORITHM, LayoutEngineRegistry, LayoutResult};
use resolve::CrossLayerReferenceResolver;
use transform::{NodeTransformer, RenderGraph};

/// Runs models through parsing, graph building, link resolution,
/// transformation and layout.
///
/// The engine registry is built once and reused for every run.
///
/// # Examples
///
/// ```rust
/// use stratum::{Pipeline, config::AppConfig};
///
/// let source = r#"{
///     "layers": {
///         "business": {
///             "elements": [
///                 {"id": "svc", "type": "service", "name": "Billing"},
///                 {"id": "proc", "type": "process", "name": "Invoice"}
///             ],
///             "relationships": [
///                 {"id": "r1", "type": "serving", "source": "svc", "target": "proc"}
///             ]
///         }
///     }
/// }"#;
///
/// let pipeline = Pipeline::new(AppConfig::default());
/// let output = pipeline.run_json(source).expect("valid document");
///
/// assert_eq!(output.graph.nodes.len(), 2);
/// assert_eq!(output.layout.nodes.len(), 2);
/// ```
#[derive(Debug)]
pub struct Pipeline {
    config: AppConfig,
    registry: LayoutEngineRegistry,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Pipeline {
    /// Create a pipeline with the built-in layout engines.
    pub fn new(config: AppConfig) -> Self {
        Self::with_registry(config, LayoutEngineRegistry::with_defaults())
    }

    /// Create a pipeline with a custom engine registry.
    pub fn with_registry(config: AppConfig, registry: LayoutEngineRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &LayoutEngineRegistry {
        &self.registry
    }

    /// Mutable access to the registry, to register additional engines.
    pub fn registry_mut(&mut self) -> &mut LayoutEngineRegistry {
        &mut self.registry
    }

    /// Parse a raw document into a model.
    ///
    /// # Errors
    ///
    /// Returns `StratumError::Parse` when a collection has the wrong shape.
    pub fn parse(&self, raw: &RawModel) -> Result<ParsedModel, StratumError> {
        info!(layers = raw.layers.len(); "Parsing model");
        let parsed = stratum_parser::parse_model(raw, &self.config.parser)?;
        debug!(
            elements = parsed.model.element_count(),
            warnings = parsed.warnings.len();
            "Model parsed"
        );
        Ok(parsed)
    }

    /// Parse a JSON document into a model.
    ///
    /// # Errors
    ///
    /// Returns `StratumError::Parse` when the text is not a model document.
    pub fn parse_json(&self, source: &str) -> Result<ParsedModel, StratumError> {
        let raw = RawModel::from_json(source)?;
        self.parse(&raw)
    }

    /// Build, resolve, transform and lay out `model`.
    ///
    /// An unknown or failing layout algorithm falls back to
    /// [`DEFAULT_ALGORITHM`] with a warning.
    ///
    /// # Errors
    ///
    /// Returns `StratumError::Layout` only when the fallback engine fails too.
    pub fn run(&self, model: &MetaModel) -> Result<PipelineOutput, StratumError> {
        let elements: Vec<Element> = model.elements().cloned().collect();
        let relationships: Vec<Relationship> = model.all_relationships().cloned().collect();
        let mut warnings = Vec::new();

        info!(
            elements = elements.len(),
            relationships = relationships.len();
            "Building graph"
        );
        let validation = validate_relationships(&elements, &relationships);
        let mut builder = GraphBuilder::new(&self.config.graph);
        let graph = builder.build_graph(&elements, &relationships);
        warnings.extend(builder.take_warnings());

        let mut resolver =
            CrossLayerReferenceResolver::new().with_reported(builder.excluded_relationships());
        let mut graph = resolver.resolve_all_links(graph, model);
        warnings.extend(resolver.take_warnings());

        let mut transformer = NodeTransformer::new();
        let mut render_graph = transformer.transform(&mut graph);
        warnings.extend(transformer.take_warnings());

        let (layout, algorithm) = self.layout(&render_graph, &mut warnings)?;
        render_graph.apply_layout(&layout);

        info!(
            nodes = layout.nodes.len(),
            edges = layout.edges.len(),
            algorithm = algorithm.as_str(),
            warnings = warnings.len();
            "Layout calculated"
        );

        Ok(PipelineOutput {
            graph,
            render_graph,
            layout,
            algorithm,
            validation,
            warnings,
        })
    }

    /// Parse and run a JSON document. Parse warnings come first in the
    /// output. Parse validation findings are merged into the output
    /// validation unless the graph stage already reported them.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::parse_json`] and [`Pipeline::run`].
    pub fn run_json(&self, source: &str) -> Result<PipelineOutput, StratumError> {
        let parsed = self.parse_json(source)?;
        let mut output = self.run(&parsed.model)?;

        let mut warnings = parsed.warnings;
        warnings.append(&mut output.warnings);
        output.warnings = warnings;
        output.validation.merge_unique(parsed.validation);
        Ok(output)
    }

    fn layout(
        &self,
        render_graph: &RenderGraph,
        warnings: &mut Vec<Diagnostic>,
    ) -> Result<(LayoutResult, String), StratumError> {
        let layout_config = &self.config.layout;
        let layout_graph = render_graph.to_layout_graph();
        let requested = layout_config
            .algorithm
            .as_deref()
            .unwrap_or(DEFAULT_ALGORITHM);

        match self.registry.get(requested) {
            Some(engine) => match engine.calculate_layout(&layout_graph, layout_config) {
                Ok(result) => return Ok((result, requested.to_string())),
                Err(err) if requested != DEFAULT_ALGORITHM => {
                    warn!(algorithm = requested, err:% = err; "Layout failed, using fallback");
                    warnings.push(
                        Diagnostic::warning(format!(
                            "layout `{requested}` failed ({err}); `{DEFAULT_ALGORITHM}` used"
                        ))
                        .with_code(ErrorCode::W501)
                        .with_subject(requested),
                    );
                }
                Err(err) => return Err(err.into()),
            },
            None => {
                warn!(algorithm = requested; "Unknown layout algorithm, using fallback");
                warnings.push(
                    Diagnostic::warning(format!(
                        "unknown layout algorithm `{requested}`; `{DEFAULT_ALGORITHM}` used"
                    ))
                    .with_code(ErrorCode::W500)
                    .with_subject(requested),
                );
            }
        }

        let engine = self.registry.get(DEFAULT_ALGORITHM).ok_or_else(|| {
            layout::LayoutError::UnknownAlgorithm(DEFAULT_ALGORITHM.to_string())
        })?;
        let result = engine.calculate_layout(&layout_graph, layout_config)?;
        Ok((result, DEFAULT_ALGORITHM.to_string()))
    }
}

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub graph: Graph,
    /// Render graph with positions and routes applied.
    pub render_graph: RenderGraph,
    pub layout: LayoutResult,
    /// Name of the engine that produced `layout`.
    pub algorithm: String,
    pub validation: ValidationReport,
    /// Recoverable problems, in pipeline order.
    pub warnings: Vec<Diagnostic>,
}

/// Serialized form of a [`PipelineOutput`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputDocument<'a> {
    algorithm: &'a str,
    render_graph: &'a RenderGraph,
    layout: &'a LayoutResult,
    hierarchy: &'a graph::Hierarchy,
    metrics: &'a graph::Metrics,
    indices: &'a graph::GraphIndices,
    cross_layer_links: &'a [resolve::CrossLayerLink],
    validation: &'a ValidationReport,
    warnings: &'a [Diagnostic],
}

impl PipelineOutput {
    fn document(&self) -> OutputDocument<'_> {
        OutputDocument {
            algorithm: &self.algorithm,
            render_graph: &self.render_graph,
            layout: &self.layout,
            hierarchy: &self.graph.hierarchy,
            metrics: &self.graph.metrics,
            indices: &self.graph.indices,
            cross_layer_links: &self.graph.cross_layer_links,
            validation: &self.validation,
            warnings: &self.warnings,
        }
    }

    /// Pretty-printed JSON of the render graph, layout and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `StratumError::Serialize` if serialization fails.
    pub fn to_json(&self) -> Result<String, StratumError> {
        Ok(serde_json::to_string_pretty(&self.document())?)
    }

    /// Same as [`PipelineOutput::to_json`], as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `StratumError::Serialize` if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, StratumError> {
        Ok(serde_json::to_value(self.document())?)
    }
}

#[cfg(test)]
mod tests {
    use stratum_core::model::{ElementKind, Layer, RelationshipKind};

    use super::*;
    use crate::layout::{LayoutConfig, LayoutEngine, LayoutError, LayoutGraph};

    struct Broken;

    impl LayoutEngine for Broken {
        fn calculate_layout(
            &self,
            _graph: &LayoutGraph,
            _config: &LayoutConfig,
        ) -> Result<LayoutResult, LayoutError> {
            Err(LayoutError::Engine {
                engine: "broken",
                message: "always fails".to_string(),
            })
        }
    }

    fn model() -> MetaModel {
        let mut layer = Layer::new("Business");
        layer.elements = vec![
            Element::new("a", ElementKind::Service, "Business"),
            Element::new("b", ElementKind::Process, "Business"),
        ];
        layer.relationships = vec![Relationship::new("r", RelationshipKind::Serving, "a", "b")];
        MetaModel::new().with_layer(layer)
    }

    fn pipeline_with(algorithm: &str) -> Pipeline {
        let config = AppConfig {
            layout: LayoutConfig::default().with_algorithm(algorithm),
            ..AppConfig::default()
        };
        Pipeline::new(config)
    }

    #[test]
    fn test_run_places_every_node() {
        let output = Pipeline::default().run(&model()).unwrap();

        assert_eq!(output.algorithm, "layered");
        assert_eq!(output.layout.nodes.len(), 2);
        assert!(output.render_graph.nodes.iter().all(|n| n.position.is_some()));
        assert!(output.validation.valid());
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_unknown_algorithm_falls_back() {
        let output = pipeline_with("spiral").run(&model()).unwrap();

        assert_eq!(output.algorithm, "layered");
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].code(), Some(ErrorCode::W500));
    }

    #[test]
    fn test_failing_engine_falls_back() {
        let mut pipeline = pipeline_with("broken");
        pipeline.registry_mut().register("broken", Broken);

        let output = pipeline.run(&model()).unwrap();

        assert_eq!(output.algorithm, "layered");
        assert_eq!(output.warnings[0].code(), Some(ErrorCode::W501));
        assert_eq!(output.layout.nodes.len(), 2);
    }

    #[test]
    fn test_failing_default_is_an_error() {
        let mut pipeline = Pipeline::default();
        pipeline.registry_mut().register(DEFAULT_ALGORITHM, Broken);

        let result = pipeline.run(&model());

        assert!(matches!(result, Err(StratumError::Layout(_))));
    }

    #[test]
    fn test_output_document_shape() {
        let output = Pipeline::default().run(&model()).unwrap();
        let value = output.to_value().unwrap();

        assert_eq!(value["algorithm"], "layered");
        assert_eq!(value["renderGraph"]["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["metrics"]["nodeCount"], 2);
        assert_eq!(value["validation"]["valid"], true);
        assert!(value["crossLayerLinks"].as_array().is_some());
    }
}
