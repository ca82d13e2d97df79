//! Candidate selection: which messages are probably receipts.
//!
//! Selection runs two passes against a [`MailboxPort`]. The sender pass
//! searches each configured domain within the date window and collects the
//! union of the results. The subject pass fetches only the `Subject` header
//! of each sender match and keeps the ones a subject pattern accepts.

mod config;

pub use config::{CONFIG_FILE_NAME, FilterConfig, default_config_paths};

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use struk_mime::Headers;
use struk_mime::charset::{DEFAULT_CASCADE, decode_cascade};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::mailbox::{CandidateId, MailboxPort};
use crate::time::Clock;

/// Outcome of one selection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSelection {
    /// Selected ids in arrival order.
    pub ids: Vec<CandidateId>,
    /// Distinct ids found by the sender pass.
    pub sender_matched: usize,
    /// Ids whose subject matched a pattern, before truncation.
    pub subject_matched: usize,
}

impl CandidateSelection {
    /// Number of ids selected.
    #[must_use]
    pub fn final_count(&self) -> usize {
        self.ids.len()
    }
}

/// Narrows a mailbox down to probable receipt messages.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    config: FilterConfig,
    patterns: Vec<Regex>,
}

impl CandidateFilter {
    /// Creates a filter, compiling the subject patterns case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] for the first pattern that does not
    /// compile.
    pub fn new(config: FilterConfig) -> Result<Self> {
        let patterns = config
            .subject_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| Error::Pattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { config, patterns })
    }

    /// Runs both passes and truncates to `max_results`.
    ///
    /// When more subjects match than `max_results` allows, the last ones in
    /// arrival order are kept. Arrival order is the order ids were first
    /// returned across the domain loop, which only approximates recency.
    ///
    /// # Errors
    ///
    /// Returns an error only when the port reports a connection or
    /// authentication failure. Other search and fetch failures skip the
    /// domain or id concerned.
    pub async fn select<P, C>(&self, port: &mut P, clock: &C) -> Result<CandidateSelection>
    where
        P: MailboxPort + Send,
        C: Clock + ?Sized,
    {
        if self.config.max_results == 0 {
            info!("max_results is 0, selecting nothing");
            return Ok(CandidateSelection::default());
        }

        let sender_ids = self.sender_pass(port, clock).await?;
        if sender_ids.is_empty() {
            info!("No messages from known sender domains");
            return Ok(CandidateSelection::default());
        }

        let mut ids = self.subject_pass(port, &sender_ids).await?;
        let subject_matched = ids.len();
        if ids.is_empty() {
            info!(sender_matched = sender_ids.len(), "No subjects matched receipt patterns");
        }

        if ids.len() > self.config.max_results {
            ids.drain(..ids.len() - self.config.max_results);
        }

        let selection = CandidateSelection {
            ids,
            sender_matched: sender_ids.len(),
            subject_matched,
        };
        info!(
            sender_matched = selection.sender_matched,
            subject_matched = selection.subject_matched,
            selected = selection.final_count(),
            "Candidate selection finished"
        );
        Ok(selection)
    }

    async fn sender_pass<P, C>(&self, port: &mut P, clock: &C) -> Result<Vec<CandidateId>>
    where
        P: MailboxPort + Send,
        C: Clock + ?Sized,
    {
        let since = clock.days_ago(self.config.date_range_days);
        info!(%since, domains = self.config.sender_domains.len(), "Searching by sender");

        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        for domain in &self.config.sender_domains {
            match port.search(domain, since).await {
                Ok(found) => {
                    if !found.is_empty() {
                        debug!(%domain, count = found.len(), "Sender search matched");
                    }
                    for id in found {
                        if seen.insert(id.clone()) {
                            ids.push(id);
                        }
                    }
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => warn!(%domain, error = %e, "Sender search failed, skipping domain"),
            }
        }

        info!(count = ids.len(), "Sender pass finished");
        Ok(ids)
    }

    async fn subject_pass<P>(&self, port: &mut P, ids: &[CandidateId]) -> Result<Vec<CandidateId>>
    where
        P: MailboxPort + Send,
    {
        let mut matched = Vec::new();

        for id in ids {
            let header = match port.fetch_header(id, &["Subject"]).await {
                Ok(header) => header,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(%id, error = %e, "Subject fetch failed, skipping message");
                    continue;
                }
            };

            let Some(subject) = decode_subject(&header) else {
                debug!(%id, "No decodable subject, dropping message");
                continue;
            };

            if self.matches_subject(&subject) {
                debug!(%id, %subject, "Subject matched");
                matched.push(id.clone());
            }
        }

        info!(count = matched.len(), "Subject pass finished");
        Ok(matched)
    }

    /// Whether any subject pattern matches, searching anywhere in `subject`.
    #[must_use]
    pub fn matches_subject(&self, subject: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(subject))
    }
}

fn decode_subject(header: &[u8]) -> Option<String> {
    let headers = Headers::parse(&decode_cascade(header, &DEFAULT_CASCADE));
    headers.get_decoded("subject")?.ok()
}
