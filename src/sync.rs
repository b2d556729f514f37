//! Fences and semaphores (GLOSSARY "Fence", "Semaphore").

use crate::error::Result;
use crate::handle::Handle;
use crate::traits::{FenceObject, SemaphoreObject};

/// A completion token returned by [`crate::queue::CommandQueue::submit`],
/// awaitable from the CPU (§5 "Suspension points").
#[derive(Debug)]
pub struct Fence(pub(crate) Handle<dyn FenceObject>);

impl Fence {
    pub fn wait(&self) -> Result<()> {
        self.0.wait()
    }

    pub fn is_complete(&self) -> bool {
        self.0.is_complete()
    }

    pub fn get_exception(&self) -> Option<crate::error::Error> {
        self.0.get_exception()
    }
}

/// An ordering token coupling the completion of one submission with the
/// start of another (§5 "Ordering guarantees", point 4).
#[derive(Debug)]
pub struct Semaphore(pub(crate) Handle<dyn SemaphoreObject>);
