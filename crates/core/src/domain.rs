//! Attribute domain schemas for discrete tabular data.

use std::fs;
use std::path::Path;

use crate::error::{DpError, Result};

/// An ordered list of attribute names identifying a marginal.
pub type Clique = Vec<String>;

/// Ordered mapping from attribute name to finite cardinality.
///
/// Attribute order follows the schema file and is the order used when
/// enumerating attribute combinations, so a fixed schema yields a fixed
/// enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    attrs: Vec<String>,
    shape: Vec<usize>,
}

impl Domain {
    /// Create a domain from parallel attribute and cardinality lists.
    pub fn new(attrs: Vec<String>, shape: Vec<usize>) -> Result<Self> {
        if attrs.len() != shape.len() {
            return Err(DpError::invalid(
                "attribute and cardinality lists must have equal length",
            ));
        }
        if shape.iter().any(|&c| c == 0) {
            return Err(DpError::invalid("attribute cardinalities must be positive"));
        }
        for (i, a) in attrs.iter().enumerate() {
            if attrs[..i].contains(a) {
                return Err(DpError::invalid(format!("duplicate attribute {a:?}")));
            }
        }
        Ok(Self { attrs, shape })
    }

    /// Load a domain from a `<name>-domain.json` schema file.
    ///
    /// The schema is a JSON object mapping attribute names to cardinalities;
    /// key order in the file is preserved.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
            .map_err(|e| DpError::dataset(format!("malformed domain schema: {e}")))?;

        let mut attrs = Vec::with_capacity(map.len());
        let mut shape = Vec::with_capacity(map.len());
        for (attr, value) in map {
            let card = value
                .as_u64()
                .filter(|&c| c > 0)
                .ok_or_else(|| {
                    DpError::dataset(format!(
                        "attribute {attr:?} must map to a positive integer cardinality"
                    ))
                })?;
            attrs.push(attr);
            shape.push(card as usize);
        }
        Self::new(attrs, shape)
    }

    /// Attribute names in schema order.
    pub fn attrs(&self) -> &[String] {
        &self.attrs
    }

    /// Per-attribute cardinalities in schema order.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the domain has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Cardinality of a single attribute, if present.
    pub fn cardinality(&self, attr: &str) -> Option<usize> {
        self.position(attr).map(|i| self.shape[i])
    }

    /// Position of an attribute in schema order, if present.
    pub fn position(&self, attr: &str) -> Option<usize> {
        self.attrs.iter().position(|a| a == attr)
    }

    /// Joint domain size of a clique: the product of its cardinalities.
    ///
    /// Errors on unknown attributes and on overflow.
    pub fn size(&self, clique: &[String]) -> Result<usize> {
        let mut size: usize = 1;
        for attr in clique {
            let card = self
                .cardinality(attr)
                .ok_or_else(|| DpError::invalid(format!("unknown attribute {attr:?}")))?;
            size = size
                .checked_mul(card)
                .ok_or_else(|| DpError::numerical("joint domain size overflows usize"))?;
        }
        Ok(size)
    }

    /// Total number of cells in this domain.
    pub fn cell_count(&self) -> Result<usize> {
        self.size(&self.attrs)
    }

    /// Restrict the domain to a clique, in the clique's order.
    pub fn project(&self, clique: &[String]) -> Result<Self> {
        let mut attrs = Vec::with_capacity(clique.len());
        let mut shape = Vec::with_capacity(clique.len());
        for attr in clique {
            let card = self
                .cardinality(attr)
                .ok_or_else(|| DpError::invalid(format!("unknown attribute {attr:?}")))?;
            attrs.push(attr.clone());
            shape.push(card);
        }
        Self::new(attrs, shape)
    }

    /// Row-major strides over this domain's cells.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.shape.len()];
        for i in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.shape[i + 1];
        }
        strides
    }

    /// Flatten per-attribute values into a cell index.
    pub fn ravel(&self, values: &[usize]) -> Result<usize> {
        if values.len() != self.shape.len() {
            return Err(DpError::invalid("value list does not match domain arity"));
        }
        let mut index = 0;
        for ((&v, &card), stride) in values.iter().zip(&self.shape).zip(self.strides()) {
            if v >= card {
                return Err(DpError::invalid(format!(
                    "value {v} out of range for cardinality {card}"
                )));
            }
            index += v * stride;
        }
        Ok(index)
    }

    /// Decompose a cell index into per-attribute values.
    pub fn unravel(&self, index: usize) -> Vec<usize> {
        let mut values = Vec::with_capacity(self.shape.len());
        let mut rem = index;
        for stride in self.strides() {
            values.push(rem / stride);
            rem %= stride;
        }
        values
    }
}
