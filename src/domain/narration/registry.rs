use super::language::LanguageCode;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks which `(job_id, language)` pairs are running so two callers never share a work dir.
#[derive(Debug, Clone, Default)]
pub struct ActiveJobs {
    running: Arc<Mutex<HashSet<(String, LanguageCode)>>>,
}

impl ActiveJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a pair; `None` when it is already running. The claim is released on drop.
    pub fn claim(&self, job_id: &str, language: LanguageCode) -> Option<JobClaim> {
        let key = (job_id.to_string(), language);
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if !running.insert(key.clone()) {
            return None;
        }
        Some(JobClaim {
            registry: self.clone(),
            key,
        })
    }

    pub fn is_running(&self, job_id: &str, language: LanguageCode) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(job_id.to_string(), language))
    }

    pub fn len(&self) -> usize {
        self.running.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct JobClaim {
    registry: ActiveJobs,
    key: (String, LanguageCode),
}

impl Drop for JobClaim {
    fn drop(&mut self) {
        self.registry
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_claim_is_refused_until_released() {
        let jobs = ActiveJobs::new();
        let claim = jobs.claim("daily", LanguageCode::English).unwrap();

        assert!(jobs.claim("daily", LanguageCode::English).is_none());
        assert!(jobs.claim("daily", LanguageCode::Spanish).is_some());
        assert!(jobs.is_running("daily", LanguageCode::English));

        drop(claim);
        assert!(!jobs.is_running("daily", LanguageCode::English));
        assert!(jobs.claim("daily", LanguageCode::English).is_some());
    }
}
