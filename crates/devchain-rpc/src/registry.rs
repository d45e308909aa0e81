//! Command registry
//!
//! Process-wide table of command descriptors, built once on first use.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::commands::descriptors;
use crate::error::{RpcError, RpcResult};
use crate::schema::Schema;

/// Name and wire schemas of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Wire method name
    pub name: &'static str,
    /// Schema of the positional parameter list
    pub params: Schema,
    /// Schema of the result
    pub returns: Schema,
}

impl CommandDescriptor {
    /// Create a descriptor
    pub fn new(name: &'static str, params: Schema, returns: Schema) -> Self {
        Self {
            name,
            params,
            returns,
        }
    }

    /// Validate raw parameters
    pub fn validate_params(&self, raw: &Value) -> RpcResult<()> {
        Ok(self.params.validate(self.name, "params", raw)?)
    }

    /// Validate a raw result
    pub fn validate_return(&self, raw: &Value) -> RpcResult<()> {
        Ok(self.returns.validate(self.name, "result", raw)?)
    }
}

/// Read-only map from method name to descriptor
#[derive(Debug)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDescriptor>,
    order: Vec<&'static str>,
}

static REGISTRY: Lazy<CommandRegistry> =
    Lazy::new(|| CommandRegistry::from_descriptors(descriptors()));

impl CommandRegistry {
    /// The single process-wide registry
    pub fn global() -> &'static CommandRegistry {
        &REGISTRY
    }

    fn from_descriptors(list: Vec<CommandDescriptor>) -> Self {
        let order = list.iter().map(|d| d.name).collect();
        let commands = list.into_iter().map(|d| (d.name, d)).collect();
        Self { commands, order }
    }

    /// Descriptor for a method name
    pub fn descriptor(&self, name: &str) -> RpcResult<&CommandDescriptor> {
        self.commands
            .get(name)
            .ok_or_else(|| RpcError::UnknownMethod(name.to_string()))
    }

    /// Validate raw parameters for a method
    pub fn validate_params(&self, name: &str, raw: &Value) -> RpcResult<()> {
        self.descriptor(name)?.validate_params(raw)
    }

    /// Validate a raw result for a method
    pub fn validate_return(&self, name: &str, raw: &Value) -> RpcResult<()> {
        self.descriptor(name)?.validate_return(raw)
    }

    /// Check if a method is registered
    pub fn has_method(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered method names, in declaration order
    pub fn method_names(&self) -> &[&'static str] {
        &self.order
    }

    /// Iterate over descriptors in declaration order
    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.order.iter().filter_map(|name| self.commands.get(name))
    }
}
