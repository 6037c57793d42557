//! Partition table store
//!
//! Owns the devices and partitions built up while a specification is
//! parsed. The table is mutated exclusively through the parse sequence
//! (`add_device` → `begin_partition` → draft setters → `commit_partition`)
//! and only read afterward. One table per parse; there is no global state.

use log::debug;

use crate::error::StoreError;

/// Partition size as written in a specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// Explicit byte count. A literal `0` stays `Bytes(0)` and does not
    /// close the device.
    Bytes(u64),
    /// The `-` sentinel: all space remaining in the device. Must be the
    /// last partition of its device.
    Remaining,
}

impl Size {
    /// Byte count used for busy-extent accounting and display.
    ///
    /// `Remaining` counts as 0: the textual format never resolves the
    /// sentinel to an absolute size.
    pub fn as_bytes(self) -> u64 {
        match self {
            Size::Bytes(n) => n,
            Size::Remaining => 0,
        }
    }

    /// Whether this is the remaining-space sentinel
    pub fn is_remaining(self) -> bool {
        matches!(self, Size::Remaining)
    }
}

/// A finalized partition record, immutable once committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Partition size
    pub size: Size,
    /// Start offset in bytes from the beginning of the device
    pub offset: u64,
    /// Display name, absent unless an explicit `(name)` field was given
    pub name: Option<String>,
    /// Read-only flag
    pub read_only: bool,
}

/// One MTD device and its ordered partitions
///
/// Partitions are stored in insertion order, which the store guarantees is
/// also non-decreasing offset order.
#[derive(Debug, Clone)]
pub struct Device {
    tag: String,
    partitions: Vec<Partition>,
}

impl Device {
    /// Device tag as written in the specification
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Finalized partitions in offset order
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Bytes already allocated from the start of the device.
    ///
    /// Offsets are monotonic, so the busy area always ends at the last
    /// registered partition. Recomputed on demand, never cached.
    fn busy_extent(&self) -> u64 {
        match self.partitions.last() {
            Some(last) => last.offset + last.size.as_bytes(),
            None => 0,
        }
    }

    /// A device is full once a remaining-space partition has been
    /// appended; nothing may follow it.
    fn is_full(&self) -> bool {
        self.partitions
            .last()
            .is_some_and(|p| p.size.is_remaining())
    }
}

/// Handle to a device registered in a [`PartitionTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId(usize);

/// In-memory partition table built from one or more specification strings
#[derive(Debug, Default)]
pub struct PartitionTable {
    devices: Vec<Device>,
}

impl PartitionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Register a new device with the given tag and return its handle.
    ///
    /// Tags are not checked for uniqueness: two definitions sharing a tag
    /// produce two independently tracked devices.
    pub fn add_device(&mut self, tag: impl Into<String>) -> DeviceId {
        let tag = tag.into();
        debug!("registered device '{}'", tag);
        self.devices.push(Device {
            tag,
            partitions: Vec::new(),
        });
        DeviceId(self.devices.len() - 1)
    }

    /// Tag of a registered device
    pub fn device_tag(&self, dev: DeviceId) -> &str {
        &self.devices[dev.0].tag
    }

    /// Registered devices in creation order
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Start a new partition on the given device.
    ///
    /// Fails if the device already holds a remaining-space partition.
    /// The draft starts just past the device's busy area; its fields are
    /// set one at a time and the partition joins the table when the draft
    /// is passed to [`commit_partition`](Self::commit_partition).
    pub fn begin_partition(&self, dev: DeviceId) -> Result<PartitionDraft, StoreError> {
        let device = &self.devices[dev.0];
        if device.is_full() {
            return Err(StoreError::DeviceFull {
                device: device.tag.clone(),
            });
        }
        let busy = device.busy_extent();
        Ok(PartitionDraft {
            dev,
            device_tag: device.tag.clone(),
            busy,
            offset: busy,
            size: Size::Bytes(0),
            name: None,
            read_only: false,
        })
    }

    /// Finalize a draft and append it to its owning device
    pub fn commit_partition(&mut self, draft: PartitionDraft) {
        let PartitionDraft {
            dev,
            offset,
            size,
            name,
            read_only,
            ..
        } = draft;
        debug!(
            "device '{}': registered partition {} at {:#x}",
            self.devices[dev.0].tag,
            name.as_deref().unwrap_or("<unnamed>"),
            offset
        );
        self.devices[dev.0].partitions.push(Partition {
            size,
            offset,
            name,
            read_only,
        });
    }

    /// First partition carrying `name`, scanning devices in creation
    /// order and partitions in offset order
    pub fn find_by_name(&self, name: &str) -> Option<&Partition> {
        self.partitions().find(|p| p.name.as_deref() == Some(name))
    }

    /// Every partition across every device, in device creation order then
    /// partition offset order. Each call starts a fresh traversal.
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.devices.iter().flat_map(|d| d.partitions.iter())
    }
}

/// Transient builder for the partition currently being parsed.
///
/// The only mutable partition state in the store: setters change the draft
/// alone, and the owning device changes when the draft is committed. The
/// busy extent is captured at creation; the parse sequence commits each
/// draft before beginning the next, so the captured value stays current.
#[derive(Debug)]
pub struct PartitionDraft {
    dev: DeviceId,
    device_tag: String,
    busy: u64,
    offset: u64,
    size: Size,
    name: Option<String>,
    read_only: bool,
}

impl PartitionDraft {
    /// Set the partition size
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Set an explicit start offset.
    ///
    /// The offset must not fall inside space already allocated to earlier
    /// partitions of the device.
    pub fn set_offset(&mut self, offset: u64) -> Result<(), StoreError> {
        if offset < self.busy {
            return Err(StoreError::Overlap {
                device: self.device_tag.clone(),
                offset,
                busy: self.busy,
            });
        }
        self.offset = offset;
        Ok(())
    }

    /// Set the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Mark the partition read-only
    pub fn set_read_only(&mut self) {
        self.read_only = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(table: &mut PartitionTable, dev: DeviceId, size: Size, name: &str) {
        let mut draft = table.begin_partition(dev).unwrap();
        draft.set_size(size);
        draft.set_name(name);
        table.commit_partition(draft);
    }

    #[test]
    fn test_default_offset_is_busy_extent() {
        let mut table = PartitionTable::new();
        let dev = table.add_device("nor0");

        commit(&mut table, dev, Size::Bytes(0x1000), "a");
        commit(&mut table, dev, Size::Bytes(0x2000), "b");

        let parts: Vec<_> = table.partitions().collect();
        assert_eq!(parts[0].offset, 0);
        assert_eq!(parts[1].offset, 0x1000);
    }

    #[test]
    fn test_explicit_offset_leaves_gap() {
        let mut table = PartitionTable::new();
        let dev = table.add_device("nor0");

        commit(&mut table, dev, Size::Bytes(0x1000), "a");

        let mut draft = table.begin_partition(dev).unwrap();
        draft.set_size(Size::Bytes(0x1000));
        draft.set_offset(0x4000).unwrap();
        table.commit_partition(draft);

        // Next default offset starts past the gap.
        let draft = table.begin_partition(dev).unwrap();
        table.commit_partition(draft);
        let parts: Vec<_> = table.partitions().collect();
        assert_eq!(parts[2].offset, 0x5000);
    }

    #[test]
    fn test_offset_below_busy_extent_rejected() {
        let mut table = PartitionTable::new();
        let dev = table.add_device("nor0");

        commit(&mut table, dev, Size::Bytes(0x1000), "a");

        let mut draft = table.begin_partition(dev).unwrap();
        let err = draft.set_offset(0x800).unwrap_err();
        assert_eq!(
            err,
            StoreError::Overlap {
                device: "nor0".to_string(),
                offset: 0x800,
                busy: 0x1000,
            }
        );
    }

    #[test]
    fn test_device_full_after_remaining() {
        let mut table = PartitionTable::new();
        let dev = table.add_device("nor0");

        commit(&mut table, dev, Size::Remaining, "rest");

        let err = table.begin_partition(dev).unwrap_err();
        assert!(matches!(err, StoreError::DeviceFull { device } if device == "nor0"));
    }

    #[test]
    fn test_zero_byte_size_does_not_fill_device() {
        let mut table = PartitionTable::new();
        let dev = table.add_device("nor0");

        commit(&mut table, dev, Size::Bytes(0), "empty");

        assert!(table.begin_partition(dev).is_ok());
    }

    #[test]
    fn test_duplicate_tags_tracked_independently() {
        let mut table = PartitionTable::new();
        let first = table.add_device("nor0");
        let second = table.add_device("nor0");
        assert_ne!(first, second);

        commit(&mut table, first, Size::Bytes(0x1000), "a");

        // The second device's busy extent is unaffected by the first.
        let draft = table.begin_partition(second).unwrap();
        table.commit_partition(draft);
        assert_eq!(table.devices()[1].partitions()[0].offset, 0);
    }

    #[test]
    fn test_find_by_name_first_match_wins() {
        let mut table = PartitionTable::new();
        let first = table.add_device("nor0");
        let second = table.add_device("nor1");

        commit(&mut table, first, Size::Bytes(0x1000), "boot");
        commit(&mut table, second, Size::Bytes(0x2000), "boot");

        let part = table.find_by_name("boot").unwrap();
        assert_eq!(part.size, Size::Bytes(0x1000));
        assert!(table.find_by_name("missing").is_none());
    }

    #[test]
    fn test_unnamed_partition_never_found_by_name() {
        let mut table = PartitionTable::new();
        let dev = table.add_device("nor0");
        let mut draft = table.begin_partition(dev).unwrap();
        draft.set_size(Size::Bytes(0x1000));
        table.commit_partition(draft);

        assert!(table.find_by_name("").is_none());
    }

    #[test]
    fn test_traversal_order_is_stable() {
        let mut table = PartitionTable::new();
        let first = table.add_device("nor0");
        let second = table.add_device("nor1");

        commit(&mut table, first, Size::Bytes(1), "a");
        commit(&mut table, second, Size::Bytes(2), "b");
        commit(&mut table, first, Size::Bytes(3), "c");

        let names = |t: &PartitionTable| -> Vec<String> {
            t.partitions()
                .map(|p| p.name.clone().unwrap())
                .collect()
        };
        assert_eq!(names(&table), ["a", "c", "b"]);
        // Restartable: a second traversal yields the same sequence.
        assert_eq!(names(&table), ["a", "c", "b"]);
    }
}
