//! Attribute lookups on identifiers.
//!
//! Convenience queries for the common `(id ^attribute value)` patterns.
//! Single-valued lookups return the first matching WME; a WME of the wrong
//! type counts as absent.

use crate::error::WmResult;
use crate::value::WmValue;

use super::{ChildValue, ChildWme, Handle, WmRead};

/// Lookup helpers available on every [`WmRead`].
pub trait WmQuery: WmRead {
    /// First WME with the given attribute.
    fn find_by_attribute(&self, id: &Handle, attribute: &str) -> WmResult<Option<ChildWme>> {
        Ok(self
            .children(id)?
            .into_iter()
            .find(|c| c.attribute == attribute))
    }

    /// Value of `(id ^attribute value)` as printed text; `None` when absent or empty.
    fn child_str(&self, id: &Handle, attribute: &str) -> WmResult<Option<String>> {
        Ok(self
            .find_by_attribute(id, attribute)?
            .map(|c| c.value.as_text(self))
            .filter(|s| !s.is_empty()))
    }

    fn child_int(&self, id: &Handle, attribute: &str) -> WmResult<Option<i64>> {
        Ok(match self.find_by_attribute(id, attribute)? {
            Some(ChildWme {
                value: ChildValue::Scalar(WmValue::Int(v)),
                ..
            }) => Some(v),
            _ => None,
        })
    }

    fn child_float(&self, id: &Handle, attribute: &str) -> WmResult<Option<f64>> {
        Ok(match self.find_by_attribute(id, attribute)? {
            Some(ChildWme {
                value: ChildValue::Scalar(WmValue::Float(v)),
                ..
            }) => Some(v),
            _ => None,
        })
    }

    /// Identifier value of `(id ^attribute <child>)`.
    fn child_id(&self, id: &Handle, attribute: &str) -> WmResult<Option<Handle>> {
        Ok(match self.find_by_attribute(id, attribute)? {
            Some(ChildWme {
                value: ChildValue::Identifier(h),
                ..
            }) => Some(h),
            _ => None,
        })
    }

    /// All identifier children, optionally restricted to one attribute.
    fn all_child_ids(&self, id: &Handle, attribute: Option<&str>) -> WmResult<Vec<Handle>> {
        Ok(self
            .children(id)?
            .into_iter()
            .filter(|c| attribute.is_none_or(|a| c.attribute == a))
            .filter_map(|c| match c.value {
                ChildValue::Identifier(h) => Some(h),
                _ => None,
            })
            .collect())
    }

    /// All constant children as text, optionally restricted to one attribute.
    fn all_child_values(&self, id: &Handle, attribute: Option<&str>) -> WmResult<Vec<String>> {
        Ok(self
            .children(id)?
            .into_iter()
            .filter(|c| attribute.is_none_or(|a| c.attribute == a))
            .filter(|c| !matches!(c.value, ChildValue::Identifier(_)))
            .map(|c| c.value.as_text(self))
            .collect())
    }

    /// Every child as `(attribute, text)`; identifiers render as their symbol.
    fn child_wmes(&self, id: &Handle) -> WmResult<Vec<(String, String)>> {
        Ok(self
            .children(id)?
            .into_iter()
            .map(|c| {
                let text = c.value.as_text(self);
                (c.attribute, text)
            })
            .collect())
    }
}

impl<T: WmRead + ?Sized> WmQuery for T {}
