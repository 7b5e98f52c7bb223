/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Upload / preview state machine: Idle -> Uploading -> Ready.
//!
//! Independent of egui. The view feeds lifecycle events in and reads
//! [`UploadState`] back out. Every accepted file gets a fresh ticket; events
//! for any other ticket are stale and dropped.

use crate::model::{CandidateFile, Notice};
use crate::validator::{self, Validation};

/// Generation number of one accepted upload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UploadTicket(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Uploading,
    Ready,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadState {
    pub loading: bool,
    pub image_url: Option<String>,
}

pub struct UploadCoordinator {
    phase: Phase,
    state: UploadState,
    current: Option<UploadTicket>,
    next_ticket: u64,
    /// Set once the transport reports done for the current ticket
    transferred: bool,
}

impl Default for UploadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadCoordinator {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            state: UploadState::default(),
            current: None,
            next_ticket: 0,
            transferred: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn image_url(&self) -> Option<&str> {
        self.state.image_url.as_deref()
    }

    /// Validate a selection and, if accepted, enter `Uploading`.
    /// A rejected file leaves the current state untouched.
    pub fn select(&mut self, file: &CandidateFile) -> Result<UploadTicket, Validation> {
        let validation = validator::validate(file);
        if !validation.accepted {
            return Err(validation);
        }

        let ticket = UploadTicket(self.next_ticket);
        self.next_ticket += 1;
        if self.phase == Phase::Uploading {
            log::debug!("{:?} superseded by {:?}", self.current, ticket);
        }

        self.current = Some(ticket);
        self.transferred = false;
        self.phase = Phase::Uploading;
        self.state.loading = true;
        self.state.image_url = None;
        log::info!("{}: upload started ({:?})", file.name, ticket);
        Ok(ticket)
    }

    /// The transport finished; preview encoding comes next, so still loading
    pub fn upload_done(&mut self, ticket: UploadTicket) -> bool {
        if !self.is_current(ticket) || self.transferred {
            log::debug!("ignoring upload-done for {:?}", ticket);
            return false;
        }
        self.transferred = true;
        true
    }

    pub fn preview_ready(&mut self, ticket: UploadTicket, data_url: String) -> bool {
        if !self.is_current(ticket) {
            log::debug!("ignoring stale preview for {:?}", ticket);
            return false;
        }
        if !self.transferred {
            log::warn!("preview for {:?} arrived before upload completed", ticket);
        }
        self.phase = Phase::Ready;
        self.state.loading = false;
        self.state.image_url = Some(data_url);
        self.current = None;
        true
    }

    /// Transport or preview failure for the current upload: back to `Idle`
    pub fn fail(&mut self, ticket: UploadTicket, error: &str) -> Option<Notice> {
        if !self.is_current(ticket) {
            log::debug!("ignoring stale failure for {:?}: {}", ticket, error);
            return None;
        }
        log::error!("upload {:?} failed: {}", ticket, error);
        self.phase = Phase::Idle;
        self.state.loading = false;
        self.state.image_url = None;
        self.current = None;
        self.transferred = false;
        Some(Notice::error(format!("Upload failed: {}", error)))
    }

    fn is_current(&self, ticket: UploadTicket) -> bool {
        self.phase == Phase::Uploading && self.current == Some(ticket)
    }
}
