//! The shared resource pool notified as archives come and go.
//!
//! A resource pool is whatever downstream cache wants to index the contents
//! of resource-eligible archives (textures, palettes, sounds). The registry
//! calls [`ResourcePool::add_archive`] when an archive becomes eligible and
//! [`ResourcePool::remove_archive`] when it stops being eligible, closes, or
//! is replaced as the base resource.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use arcmgr::{Archive, ArchiveId, Registry, RegistryConfig, ResourcePool};
//!
//! #[derive(Default)]
//! struct Indexed(Vec<ArchiveId>);
//!
//! impl ResourcePool for Indexed {
//!     fn add_archive(&mut self, id: ArchiveId, _archive: &dyn Archive) {
//!         self.0.push(id);
//!     }
//!     fn remove_archive(&mut self, id: ArchiveId) {
//!         self.0.retain(|&other| other != id);
//!     }
//! }
//!
//! let pool = Rc::new(RefCell::new(Indexed::default()));
//! let mut registry = Registry::with_pool(RegistryConfig::default(), Rc::clone(&pool));
//! let id = registry.new_archive(arcmgr::FormatId::Wad).unwrap();
//! assert_eq!(pool.borrow().0, vec![id]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::archive::{Archive, ArchiveId};

/// Receives archive eligibility changes from the registry.
pub trait ResourcePool {
    /// Called when an archive's resources become available.
    fn add_archive(&mut self, id: ArchiveId, archive: &dyn Archive) {
        let _ = (id, archive);
    }

    /// Called when an archive's resources must be dropped.
    fn remove_archive(&mut self, id: ArchiveId) {
        let _ = id;
    }
}

/// A pool that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPool;

impl ResourcePool for NoPool {}

impl<P: ResourcePool> ResourcePool for Rc<RefCell<P>> {
    fn add_archive(&mut self, id: ArchiveId, archive: &dyn Archive) {
        self.borrow_mut().add_archive(id, archive);
    }

    fn remove_archive(&mut self, id: ArchiveId) {
        self.borrow_mut().remove_archive(id);
    }
}
