//! Trigger dispatch shared by the Lambda runtime, the CLI and the emulator.

use std::fmt;
use std::str::FromStr;

use crate::config::EdgeConfig;
use crate::edge::{EdgeEvent, EdgeResult};
use crate::error::EdgeError;
use crate::redirect::RequestRedirector;
use crate::rewrite::{HttpIndexFetcher, IndexFetcher, ResponseRewriter, Rewrite};

/// CDN hook point a handler is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Trigger {
    OriginRequest,
    OriginResponse,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::OriginRequest => "origin-request",
            Trigger::OriginResponse => "origin-response",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "origin-request" => Ok(Trigger::OriginRequest),
            "origin-response" => Ok(Trigger::OriginResponse),
            other => Err(format!("unsupported trigger `{other}`")),
        }
    }
}

/// Both edge transformers, built once and shared across invocations.
#[derive(Debug, Clone)]
pub struct EdgeHandlers<F = HttpIndexFetcher> {
    pub rewriter: ResponseRewriter<F>,
    pub redirector: RequestRedirector,
    pub rewrite_enabled: bool,
    pub redirect_enabled: bool,
}

impl EdgeHandlers<HttpIndexFetcher> {
    pub fn from_config(config: &EdgeConfig) -> Result<Self, EdgeError> {
        Ok(Self {
            rewriter: ResponseRewriter::from_config(&config.rewrite)?,
            redirector: RequestRedirector::from_config(&config.redirect)?,
            rewrite_enabled: config.rewrite.enabled,
            redirect_enabled: config.redirect.enabled,
        })
    }
}

impl<F: IndexFetcher> EdgeHandlers<F> {
    pub fn new(rewriter: ResponseRewriter<F>, redirector: RequestRedirector) -> Self {
        Self {
            rewriter,
            redirector,
            rewrite_enabled: true,
            redirect_enabled: true,
        }
    }

    /// Origin-request: redirect short match URLs, pass everything else.
    pub fn origin_request(&self, event: EdgeEvent) -> Result<EdgeResult, EdgeError> {
        let record = event.into_record()?;
        if !self.redirect_enabled {
            return Ok(EdgeResult::Request(record.request));
        }
        Ok(self.redirector.handle(record).into_result())
    }

    /// Origin-response: substitute the index document for route misses.
    pub async fn origin_response(&self, event: EdgeEvent) -> Result<EdgeResult, EdgeError> {
        let record = event.into_record()?;
        if !self.rewrite_enabled {
            let response = record.response.ok_or(EdgeError::MissingResponse)?;
            return Ok(Rewrite::PassThrough(response).into_result());
        }
        Ok(self.rewriter.handle(record).await?.into_result())
    }

    pub async fn dispatch(&self, trigger: Trigger, event: EdgeEvent) -> Result<EdgeResult, EdgeError> {
        match trigger {
            Trigger::OriginRequest => self.origin_request(event),
            Trigger::OriginResponse => self.origin_response(event).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_names_round_trip() {
        for trigger in [Trigger::OriginRequest, Trigger::OriginResponse] {
            assert_eq!(trigger.as_str().parse::<Trigger>(), Ok(trigger));
        }
        assert!("viewer-request".parse::<Trigger>().is_err());
    }
}
