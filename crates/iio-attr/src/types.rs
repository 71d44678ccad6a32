use crate::{dispatch::parse_channel_number, AttrError, Result};
use core::fmt;
use std::collections::HashSet;

/// Per-request channel properties handed to every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelInfo {
    pub number: i32,
    pub is_output: bool,
}

impl ChannelInfo {
    pub fn new(channel: &str, is_output: bool) -> Self {
        Self {
            number: parse_channel_number(channel),
            is_output,
        }
    }
}

/// Produces the textual value of an attribute.
pub type ReadFn<D> = fn(&mut D, &ChannelInfo) -> Result<String>;

/// Applies a textual value to the device.
pub type WriteFn<D> = fn(&mut D, &ChannelInfo, &str) -> Result<()>;

/// A named attribute with independent read and write capabilities.
pub struct Attribute<D> {
    name: &'static str,
    read: Option<ReadFn<D>>,
    write: Option<WriteFn<D>>,
}

impl<D> Attribute<D> {
    pub const fn read_only(name: &'static str, read: ReadFn<D>) -> Self {
        Self {
            name,
            read: Some(read),
            write: None,
        }
    }

    pub const fn write_only(name: &'static str, write: WriteFn<D>) -> Self {
        Self {
            name,
            read: None,
            write: Some(write),
        }
    }

    pub const fn read_write(name: &'static str, read: ReadFn<D>, write: WriteFn<D>) -> Self {
        Self {
            name,
            read: Some(read),
            write: Some(write),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_readable(&self) -> bool {
        self.read.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    pub fn read(&self, dev: &mut D, channel: &ChannelInfo) -> Result<String> {
        match self.read {
            Some(f) => f(dev, channel),
            None => Err(AttrError::NotReadable(self.name.to_string())),
        }
    }

    pub fn write(&self, dev: &mut D, channel: &ChannelInfo, value: &str) -> Result<()> {
        match self.write {
            Some(f) => f(dev, channel, value),
            None => Err(AttrError::NotWritable(self.name.to_string())),
        }
    }
}

impl<D> Clone for Attribute<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Attribute<D> {}

impl<D> fmt::Debug for Attribute<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Ordered attribute handlers for one channel class.
///
/// Names are unique and non-empty; the empty name is reserved for bulk access.
pub struct AttributeTable<D> {
    attrs: Vec<Attribute<D>>,
}

impl<D> AttributeTable<D> {
    pub fn new(attrs: impl IntoIterator<Item = Attribute<D>>) -> Result<Self> {
        let attrs: Vec<Attribute<D>> = attrs.into_iter().collect();
        let mut seen = HashSet::new();
        for a in &attrs {
            if a.name.is_empty() {
                return Err(AttrError::InvalidArgument(
                    "empty attribute name is reserved for bulk access".into(),
                ));
            }
            if !seen.insert(a.name) {
                return Err(AttrError::DuplicateAttribute(a.name.to_string()));
            }
        }
        Ok(Self { attrs })
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attribute<D>> {
        self.attrs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute<D>> {
        self.attrs.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attrs.iter().map(|a| a.name)
    }
}

impl<D> Clone for AttributeTable<D> {
    fn clone(&self) -> Self {
        Self {
            attrs: self.attrs.clone(),
        }
    }
}

impl<D> fmt::Debug for AttributeTable<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.attrs.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_one(_: &mut u32, _: &ChannelInfo) -> Result<String> {
        Ok("1".into())
    }

    fn store(dev: &mut u32, _: &ChannelInfo, v: &str) -> Result<()> {
        *dev = v
            .parse()
            .map_err(|_| AttrError::InvalidArgument(v.to_string()))?;
        Ok(())
    }

    #[test]
    fn test_channel_info_from_name() {
        let ch = ChannelInfo::new("voltage12", true);
        assert_eq!(ch.number, 12);
        assert!(ch.is_output);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = AttributeTable::new([
            Attribute::read_only("raw", read_one),
            Attribute::read_only("raw", read_one),
        ])
        .unwrap_err();
        assert!(matches!(err, AttrError::DuplicateAttribute(n) if n == "raw"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = AttributeTable::new([Attribute::read_only("", read_one)]).unwrap_err();
        assert!(matches!(err, AttrError::InvalidArgument(_)));
    }

    #[test]
    fn test_capabilities_are_independent() {
        let ch = ChannelInfo::new("x", false);
        let mut dev = 0u32;
        let ro = Attribute::read_only("ro", read_one);
        let wo = Attribute::write_only("wo", store);
        assert!(matches!(ro.write(&mut dev, &ch, "3"), Err(AttrError::NotWritable(_))));
        assert!(matches!(wo.read(&mut dev, &ch), Err(AttrError::NotReadable(_))));
        wo.write(&mut dev, &ch, "3").unwrap();
        assert_eq!(dev, 3);
    }

    #[test]
    fn test_table_preserves_order() {
        let t = AttributeTable::new([
            Attribute::read_only("b", read_one),
            Attribute::read_write("a", read_one, store),
        ])
        .unwrap();
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(t.len(), 2);
    }
}
