//! Mock Dictation for Testing
//!
//! Counts start/stop calls and lets the test inject recognition events
//! through the sink the runtime handed over.

use anyhow::Result;
use lexitalk::capture::{Dictation, DictationEvent, DictationSink};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct DictationLog {
    pub starts: usize,
    pub stops: usize,
    pub sink: Option<DictationSink>,
}

/// Handle the test keeps after the mock moves into the runtime
#[derive(Debug, Clone, Default)]
pub struct DictationProbe(pub Arc<Mutex<DictationLog>>);

impl DictationProbe {
    pub fn starts(&self) -> usize {
        self.0.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.0.lock().unwrap().stops
    }

    pub fn emit(&self, event: DictationEvent) {
        let log = self.0.lock().unwrap();
        log.sink
            .as_ref()
            .expect("dictation was never detected")
            .send(event)
            .expect("runtime dropped the dictation channel");
    }
}

pub struct MockDictation {
    probe: DictationProbe,
    /// Fail every start
    pub fail_start: bool,
}

impl MockDictation {
    pub fn new(sink: DictationSink, probe: &DictationProbe) -> Self {
        probe.0.lock().unwrap().sink = Some(sink);
        Self {
            probe: probe.clone(),
            fail_start: false,
        }
    }
}

impl Dictation for MockDictation {
    fn start(&mut self) -> Result<()> {
        self.probe.0.lock().unwrap().starts += 1;
        if self.fail_start {
            anyhow::bail!("Mock dictation failure");
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.probe.0.lock().unwrap().stops += 1;
    }

    fn name(&self) -> &str {
        "mock"
    }
}
