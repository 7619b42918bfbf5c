//! # Events Module
//!
//! Progress reporting for front ends.
//!
//! The core runs synchronously on the caller's thread. A front end that wants
//! a progress display runs the job on a worker thread and drains the
//! receiver on its own:
//!
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let worker = std::thread::spawn(move || organizer_job(&sender));
//! for event in receiver.iter() {
//!     if let Event::Transfer(TransferEvent::Progress(p)) = event {
//!         println!("{}/{} {}", p.completed, p.total, p.filename);
//!     }
//! }
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
