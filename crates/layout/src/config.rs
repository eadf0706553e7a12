//! Per-tree tunables shared by every node created against them.

use crate::node::Node;
use crate::tree::NodeId;
use anyhow::{Result, bail};
use core::any::Any;
use core::fmt;
use log::Level;
use serde::Serialize;
use sprig_values::{ExperimentalFeature, LogLevel};
use std::rc::Rc;

/// Diagnostic sink. Receives the node the message is about, if any.
pub type LoggerFunc = Rc<dyn Fn(Option<NodeId>, LogLevel, &str)>;

/// Custom duplication policy for shared children.
///
/// Called with the node being cloned, the id of the parent that is about to
/// mutate it and the child's index in that parent. Returning `None` falls back
/// to a plain copy of the node.
pub type CloneNodeFunc = Rc<dyn Fn(&Node, NodeId, usize) -> Option<Node>>;

/// Layout configuration.
///
/// Built once, wrapped in an `Rc` and handed to the nodes that use it.
#[derive(Clone, Serialize)]
pub struct Config {
    /// Device pixels per layout point; `0` disables pixel rounding.
    point_scale_factor: f32,
    /// Use `row` / `stretch` as initial style values and web flex-shrink.
    use_web_defaults: bool,
    /// Opt into the historical stretch sizing of content-sized containers.
    use_legacy_stretch_behaviour: bool,
    /// Enabled experimental features, indexed by [`ExperimentalFeature::index`].
    experimental_features: [bool; ExperimentalFeature::COUNT],
    /// Print the laid-out tree through the logger after every pass.
    print_tree: bool,
    #[serde(skip)]
    logger: Option<LoggerFunc>,
    #[serde(skip)]
    clone_node: Option<CloneNodeFunc>,
    #[serde(skip)]
    context: Option<Rc<dyn Any>>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            point_scale_factor: 1.0,
            use_web_defaults: false,
            use_legacy_stretch_behaviour: false,
            experimental_features: [false; ExperimentalFeature::COUNT],
            print_tree: false,
            logger: None,
            clone_node: None,
            context: None,
        }
    }

    /// Set the pixel grid granularity. Negative factors are rejected.
    ///
    /// # Errors
    /// Returns an error if `factor` is negative.
    pub fn set_point_scale_factor(&mut self, factor: f32) -> Result<()> {
        if factor < 0.0 {
            let message = format!("Scale factor should not be less than zero, got {factor}");
            self.log(None, LogLevel::Fatal, &message);
            bail!(message);
        }
        self.point_scale_factor = factor;
        Ok(())
    }

    pub fn point_scale_factor(&self) -> f32 {
        self.point_scale_factor
    }

    pub fn set_use_web_defaults(&mut self, enabled: bool) {
        self.use_web_defaults = enabled;
    }

    pub fn use_web_defaults(&self) -> bool {
        self.use_web_defaults
    }

    pub fn set_use_legacy_stretch_behaviour(&mut self, enabled: bool) {
        self.use_legacy_stretch_behaviour = enabled;
    }

    pub fn use_legacy_stretch_behaviour(&self) -> bool {
        self.use_legacy_stretch_behaviour
    }

    pub fn set_experimental_feature_enabled(&mut self, feature: ExperimentalFeature, enabled: bool) {
        self.experimental_features[feature.index()] = enabled;
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeature) -> bool {
        self.experimental_features[feature.index()]
    }

    pub fn set_print_tree(&mut self, enabled: bool) {
        self.print_tree = enabled;
    }

    pub fn print_tree(&self) -> bool {
        self.print_tree
    }

    /// Install a diagnostic sink; `None` restores forwarding to the `log` facade.
    pub fn set_logger(&mut self, logger: Option<LoggerFunc>) {
        self.logger = logger;
    }

    pub fn set_clone_node_func(&mut self, clone_node: Option<CloneNodeFunc>) {
        self.clone_node = clone_node;
    }

    pub(crate) fn clone_node_func(&self) -> Option<CloneNodeFunc> {
        self.clone_node.as_ref().map(Rc::clone)
    }

    pub fn set_context(&mut self, context: Option<Rc<dyn Any>>) {
        self.context = context;
    }

    pub fn context(&self) -> Option<&dyn Any> {
        self.context.as_deref()
    }

    /// Route a diagnostic to the installed logger or to the `log` facade.
    pub fn log(&self, node: Option<NodeId>, level: LogLevel, message: &str) {
        if let Some(logger) = &self.logger {
            logger(node, level, message);
            return;
        }
        let facade_level = match level {
            LogLevel::Error | LogLevel::Fatal => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Verbose => Level::Trace,
        };
        match node {
            Some(id) => log::log!(target: "sprig::layout", facade_level, "[{id}] {message}"),
            None => log::log!(target: "sprig::layout", facade_level, "{message}"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Config")
            .field("point_scale_factor", &self.point_scale_factor)
            .field("use_web_defaults", &self.use_web_defaults)
            .field("use_legacy_stretch_behaviour", &self.use_legacy_stretch_behaviour)
            .field("experimental_features", &self.experimental_features)
            .field("print_tree", &self.print_tree)
            .field("has_logger", &self.logger.is_some())
            .field("has_clone_node", &self.clone_node.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    #[test]
    /// # Panics
    /// Panics if a negative scale factor is accepted.
    fn negative_scale_factor_is_rejected() {
        let mut config = Config::new();
        assert!(config.set_point_scale_factor(-1.0).is_err());
        assert!((config.point_scale_factor() - 1.0).abs() < f32::EPSILON);
        assert!(config.set_point_scale_factor(0.0).is_ok());
        assert!(config.point_scale_factor().abs() < f32::EPSILON);
    }

    #[test]
    /// # Panics
    /// Panics if messages are not routed to an installed logger.
    fn custom_logger_receives_messages() {
        let seen: Rc<RefCell<Vec<(LogLevel, String)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut config = Config::new();
        config.set_logger(Some(Rc::new(move |_node, level, message: &str| {
            sink.borrow_mut().push((level, message.to_owned()));
        })));
        config.log(None, LogLevel::Warn, "careful");
        assert_eq!(seen.borrow().as_slice(), &[(LogLevel::Warn, "careful".to_owned())]);
    }

    #[test]
    /// # Panics
    /// Panics if the serialized config loses its knobs.
    fn serializes_plain_knobs() {
        let mut config = Config::new();
        config.set_use_web_defaults(true);
        config.set_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis, true);
        let json = serde_json::to_value(&config).unwrap_or_default();
        assert_eq!(json["use_web_defaults"], serde_json::json!(true));
        assert_eq!(json["experimental_features"][0], serde_json::json!(true));
    }
}
