use tracing::{info, warn};

use crate::graph::{BuildSummary, GraphBuilder, GraphStore};
use crate::layout::{LayoutConfig, PositionSampler, RelaxationReport, relax_initial};
use crate::syntax::{ParseError, SourceParser};
use crate::util::stable_seed;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Analysis {
    pub summary: BuildSummary,
    pub relaxation: RelaxationReport,
}

/// One build pass: clear, parse, build, settle.
///
/// The store is cleared before parsing, so a syntax error leaves it empty
/// rather than holding the previous graph. Without an explicit `seed` the
/// sampler is seeded from the source text.
pub fn analyze(
    source: &str,
    parser: &dyn SourceParser,
    store: &mut GraphStore,
    config: &LayoutConfig,
    seed: Option<u64>,
) -> Result<Analysis, ParseError> {
    store.clear();

    let program = parser.parse(source)?;

    let seed = seed.unwrap_or_else(|| stable_seed(source));
    let mut sampler = PositionSampler::new(seed, config.sampler_attempts);
    let summary = GraphBuilder::new(store, &mut sampler, config).build(&program);
    let relaxation = relax_initial(store, config);

    info!(
        functions = summary.functions,
        variables = summary.variables,
        imports = summary.imports,
        nodes = summary.nodes,
        edges = summary.edges,
        iterations = relaxation.iterations,
        converged = relaxation.converged,
        "analysis complete"
    );

    let unreachable = store.unreachable_nodes();
    if !unreachable.is_empty() {
        warn!(count = unreachable.len(), "nodes without a path from the main node");
    }
    let stale = store.stale_edges();
    if !stale.is_empty() {
        warn!(count = stale.len(), "edges out of step with their endpoints");
    }

    Ok(Analysis {
        summary,
        relaxation,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::graph::NodeKind;
    use crate::syntax::{Syntax, parse_estree_json};

    use super::*;

    /// Returns a fixed tree, or a syntax error for sources containing `@@`.
    struct StaticParser {
        tree: String,
    }

    impl StaticParser {
        fn new(tree: serde_json::Value) -> Self {
            Self {
                tree: tree.to_string(),
            }
        }
    }

    impl SourceParser for StaticParser {
        fn parse(&self, source: &str) -> Result<Syntax, ParseError> {
            if source.contains("@@") {
                return Err(ParseError::Syntax {
                    message: "Unexpected character '@' (1:0)".to_owned(),
                });
            }
            parse_estree_json(&self.tree)
        }
    }

    fn sample_parser() -> StaticParser {
        StaticParser::new(json!({
            "type": "Program",
            "body": [
                {
                    "type": "VariableDeclaration",
                    "kind": "const",
                    "declarations": [{
                        "type": "VariableDeclarator",
                        "id": { "type": "Identifier", "name": "x" },
                        "init": { "type": "Literal", "value": 5, "raw": "5" }
                    }]
                },
                {
                    "type": "FunctionDeclaration",
                    "id": { "type": "Identifier", "name": "foo" },
                    "params": [],
                    "body": {
                        "type": "BlockStatement",
                        "body": [{
                            "type": "ExpressionStatement",
                            "expression": { "type": "Identifier", "name": "x" }
                        }]
                    }
                }
            ]
        }))
    }

    #[test]
    fn successful_pass_builds_and_settles() {
        let parser = sample_parser();
        let mut store = GraphStore::new();

        let analysis = analyze("const x = 5;", &parser, &mut store, &LayoutConfig::default(), None)
            .expect("analysis should succeed");

        assert_eq!(analysis.summary.functions, 1);
        assert_eq!(analysis.summary.variables, 1);
        assert_eq!(analysis.summary.nodes, 3);
        assert_eq!(store.node_count(), 3);
        assert!(analysis.relaxation.iterations <= LayoutConfig::default().max_iterations);
        assert!(store.stale_edges().is_empty());
        assert!(store.unreachable_nodes().is_empty());
    }

    #[test]
    fn syntax_error_leaves_an_empty_graph() {
        let parser = sample_parser();
        let mut store = GraphStore::new();
        let config = LayoutConfig::default();

        analyze("const x = 5;", &parser, &mut store, &config, None).expect("first pass");
        assert!(!store.is_empty());

        let error = analyze("@@", &parser, &mut store, &config, None).unwrap_err();

        assert!(matches!(error, ParseError::Syntax { .. }));
        assert!(store.is_empty());
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn same_source_gives_same_layout() {
        let parser = sample_parser();
        let config = LayoutConfig::default();
        let mut first = GraphStore::new();
        let mut second = GraphStore::new();

        analyze("const x = 5;", &parser, &mut first, &config, None).unwrap();
        analyze("const x = 5;", &parser, &mut second, &config, None).unwrap();

        let positions = |store: &GraphStore| store.positions().collect::<Vec<_>>();
        assert_eq!(positions(&first), positions(&second));
    }

    #[test]
    fn explicit_seed_overrides_the_source_hash() {
        let parser = sample_parser();
        let config = LayoutConfig::default();
        let mut first = GraphStore::new();
        let mut second = GraphStore::new();

        analyze("a", &parser, &mut first, &config, Some(42)).unwrap();
        analyze("b", &parser, &mut second, &config, Some(42)).unwrap();

        let positions = |store: &GraphStore| store.positions().collect::<Vec<_>>();
        assert_eq!(positions(&first), positions(&second));
        assert_eq!(first.kind_of(first.main().unwrap()), Some(NodeKind::Main));
    }
}
