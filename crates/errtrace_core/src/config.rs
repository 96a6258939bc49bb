/// Knobs for one analysis run. A plain struct, not a config file format —
/// the input contract has no notion of a project manifest, so whatever
/// embeds this analyzer is responsible for deciding these values (e.g. from
/// its own build graph) and constructing one directly.
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Publish every function's resolved `ReturnFact`/`ParamCheckFact` to
    /// the fact store, not just exported ones. Needed when the embedding
    /// caller wants to inspect internals (e.g. the cache snapshot feature);
    /// the checker itself only ever needs exported facts from foreign
    /// packages.
    pub publish_unexported: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig { publish_unexported: true }
    }
}
