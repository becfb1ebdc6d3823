//! Lookups over a loaded netlist: top module, modules by instance path, net names.

use crate::bit::Bit;
use crate::error::NetlistError;
use crate::model::{Module, Netlist};
use std::collections::HashMap;

impl Netlist {
    /// Returns the module with the given name.
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Finds the top-level module.
    ///
    /// With `requested` set, that module is returned directly. Otherwise the
    /// first module carrying a truthy `top` attribute is used.
    pub fn top_module(&self, requested: Option<&str>) -> Result<(&str, &Module), NetlistError> {
        if let Some(name) = requested {
            return self
                .modules
                .get_key_value(name)
                .map(|(k, m)| (k.as_str(), m))
                .ok_or_else(|| NetlistError::UnknownModule(name.to_string()));
        }
        self.modules
            .iter()
            .find(|(_, m)| m.is_top())
            .map(|(k, m)| (k.as_str(), m))
            .ok_or(NetlistError::MissingTop)
    }

    /// Resolves an instance path to the module definition it names.
    ///
    /// The first element names the top module; every following element is a
    /// cell instance inside the module reached so far. Returns `Ok(None)` if
    /// an element names no cell, or a cell whose type has no module body.
    pub fn module_by_path<S: AsRef<str>>(
        &self,
        top: Option<&str>,
        path: &[S],
    ) -> Result<Option<(&str, &Module)>, NetlistError> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(None);
        };
        let (top_name, top_module) = self.top_module(top)?;
        if first.as_ref() != top_name {
            return Ok(None);
        }
        let mut current = (top_name, top_module);
        for instance in rest {
            let Some(cell) = current.1.cells.get(instance.as_ref()) else {
                return Ok(None);
            };
            match self.modules.get_key_value(&cell.cell_type) {
                Some((name, module)) => current = (name.as_str(), module),
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

/// Maps net ids of one module to the name of the net that carries them.
#[derive(Debug, Default)]
pub struct NetNameIndex<'n> {
    names: HashMap<u64, &'n str>,
}

impl<'n> NetNameIndex<'n> {
    /// Indexes the `netnames` table of a module.
    ///
    /// When several names cover the same net, the last one listed wins.
    pub fn new(module: &'n Module) -> Self {
        let mut names = HashMap::new();
        for (name, net) in &module.netnames {
            for bit in &net.bits {
                if let Bit::Net(id) = bit {
                    names.insert(*id, name.as_str());
                }
            }
        }
        Self { names }
    }

    /// Returns the net name carrying `net`.
    pub fn name_of(&self, net: u64) -> Option<&'n str> {
        self.names.get(&net).copied()
    }

    /// Returns the number of indexed nets.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no nets are named.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
