// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Runs a batch on a worker thread, streaming progress back over a channel.
//!
//! The `Organizer` moves onto the worker for the duration of the run and is
//! handed back by `finish`, so edits can only happen between runs.

use std::{
  path::PathBuf,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::{
  error::PipelineError,
  org::{BatchObserver, BatchResult, Organizer, Progress},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
  Idle,
  Running,
  Completed,
  Failed,
  Cancelled,
}

impl RunState {
  pub fn is_finished(self) -> bool {
    matches!(self, RunState::Completed | RunState::Failed | RunState::Cancelled)
  }
}

/// Messages from the worker. Any number of `Progress` events is followed by
/// exactly one terminal event.
#[derive(Debug)]
pub enum PipelineEvent {
  Progress(Progress),
  Completed(BatchResult),
  /// The batch could not run; no file was touched.
  Failed(PipelineError),
  /// Stopped on request. Files handled so far are organized.
  Cancelled(BatchResult),
}

impl PipelineEvent {
  fn state(&self) -> Option<RunState> {
    match self {
      PipelineEvent::Progress(_) => None,
      PipelineEvent::Completed(_) => Some(RunState::Completed),
      PipelineEvent::Failed(_) => Some(RunState::Failed),
      PipelineEvent::Cancelled(_) => Some(RunState::Cancelled),
    }
  }
}

struct ChannelObserver {
  sender: Sender<PipelineEvent>,
  cancel: Arc<AtomicBool>,
}

impl BatchObserver for ChannelObserver {
  fn should_continue(&mut self) -> bool {
    !self.cancel.load(Ordering::Relaxed)
  }

  fn file_done(&mut self, progress: &Progress) {
    // Receiver may be gone if the caller stopped listening.
    let _ = self.sender.send(PipelineEvent::Progress(progress.clone()));
  }
}

pub struct PipelineRunner {
  state:     RunState,
  organizer: Option<Organizer>,
  worker:    Option<JoinHandle<Organizer>>,
  events:    Option<Receiver<PipelineEvent>>,
  cancel:    Arc<AtomicBool>,
}

impl PipelineRunner {
  pub fn new(organizer: Organizer) -> Self {
    Self {
      state:     RunState::Idle,
      organizer: Some(organizer),
      worker:    None,
      events:    None,
      cancel:    Arc::new(AtomicBool::new(false)),
    }
  }

  pub fn state(&self) -> RunState {
    self.state
  }

  /// Starts organizing `files` on a worker thread. A runner runs once.
  pub fn start(&mut self, files: Vec<PathBuf>, year_override: Option<i32>) -> Result<(), PipelineError> {
    if self.state != RunState::Idle {
      return Err(PipelineError::AlreadyStarted);
    }
    let Some(mut organizer) = self.organizer.take() else {
      return Err(PipelineError::AlreadyStarted);
    };

    let (sender, receiver) = crossbeam_channel::unbounded();
    let mut observer = ChannelObserver {
      sender: sender.clone(),
      cancel: Arc::clone(&self.cancel),
    };

    log::debug!("Starting pipeline worker for {} files.", files.len());

    let worker = thread::Builder::new()
      .name("pipeline".to_string())
      .spawn(move || {
        let event = match organizer.process_batch_with(&files, year_override, &mut observer) {
          Ok(result) => {
            if let Err(e) = organizer.save_manifest() {
              log::error!("{e}");
            }
            if result.interrupted {
              PipelineEvent::Cancelled(result)
            } else {
              PipelineEvent::Completed(result)
            }
          }
          Err(e) => PipelineEvent::Failed(e),
        };

        let _ = sender.send(event);
        organizer
      })
      .map_err(|source| PipelineError::WorkerSpawn { source })?;

    self.worker = Some(worker);
    self.events = Some(receiver);
    self.state = RunState::Running;
    Ok(())
  }

  /// Requests cancellation. Takes effect before the next file. Requested
  /// before `start`, the run stops before its first file.
  pub fn cancel(&self) {
    log::info!("Cancelling pipeline.");
    self.cancel.store(true, Ordering::Relaxed);
  }

  /// Blocks for the next event. Returns `None` once the terminal event has
  /// been delivered, or if the run never started.
  pub fn next_event(&mut self) -> Option<PipelineEvent> {
    if self.state != RunState::Running {
      return None;
    }

    match self.events.as_ref()?.recv() {
      Ok(event) => Some(self.observe(event)),
      Err(_) => {
        // Worker ended without a terminal event.
        self.state = RunState::Failed;
        None
      }
    }
  }

  /// Returns the next event if one is ready.
  pub fn try_next_event(&mut self) -> Option<PipelineEvent> {
    if self.state != RunState::Running {
      return None;
    }

    match self.events.as_ref()?.try_recv() {
      Ok(event) => Some(self.observe(event)),
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => {
        self.state = RunState::Failed;
        None
      }
    }
  }

  /// Waits for the worker and returns the organizer, with its updated index.
  pub fn finish(mut self) -> Result<Organizer, PipelineError> {
    if let Some(organizer) = self.organizer.take() {
      return Ok(organizer);
    }

    let worker = self.worker.take().ok_or(PipelineError::WorkerPanicked)?;
    worker.join().map_err(|_| PipelineError::WorkerPanicked)
  }

  fn observe(&mut self, event: PipelineEvent) -> PipelineEvent {
    if let Some(state) = event.state() {
      log::debug!("Pipeline {state:?}.");
      self.state = state;
    }
    event
  }
}
