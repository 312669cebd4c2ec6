//! Pagination - chain repeated executions through continuation tokens
//!
//! A paginator is a lazy, finite, non-restartable sequence: each pull
//! executes one command with the current cursor written into the input
//! token parameters, then extracts the next cursor from the response. Page
//! N+1 is never requested before page N's cursor has been read.

use super::future::CallOutput;
use super::Client;
use crate::error::{AwsError, AwsResult};
use crate::model::paths::{is_present_token, resolve};
use crate::model::{OperationModel, PaginationConfig};
use futures::stream::{self, Stream};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug)]
enum PageState {
    Start,
    Cursor(Vec<Option<Value>>),
    Done,
}

/// Lazy sequence of result pages for one list-type operation.
#[derive(Debug)]
pub struct Paginator {
    client: Client,
    model: Arc<OperationModel>,
    config: PaginationConfig,
    base: Value,
    state: PageState,
}

impl Paginator {
    pub(crate) fn new(
        client: Client,
        model: Arc<OperationModel>,
        parameters: Value,
    ) -> AwsResult<Self> {
        // Shared metadata checkpoint: page and item access fail identically
        // on unpaginable operations, before any request goes out.
        let Some(config) = model.pagination.clone() else {
            return Err(AwsError::pagination_config(
                &model.name,
                "operation has no pagination metadata",
            ));
        };

        Ok(Self {
            client,
            model,
            config,
            base: parameters,
            state: PageState::Start,
        })
    }

    /// Cap the page size via the model's limit key.
    pub fn page_size(mut self, size: u64) -> AwsResult<Self> {
        let Some(limit_key) = self.config.limit_key.clone() else {
            return Err(AwsError::pagination_config(
                &self.model.name,
                "operation does not declare a limit key",
            ));
        };
        if let Value::Object(map) = &mut self.base {
            map.insert(limit_key, Value::from(size));
        }
        Ok(self)
    }

    /// Fetch the next page, or `None` once the sequence is exhausted.
    ///
    /// Exhaustion is not an error; a failed execution ends the sequence
    /// after yielding its error.
    pub async fn next_page(&mut self) -> Option<AwsResult<Value>> {
        let parameters = match &self.state {
            PageState::Done => return None,
            PageState::Start => self.base.clone(),
            PageState::Cursor(tokens) => {
                let mut parameters = self.base.clone();
                if let Value::Object(map) = &mut parameters {
                    for (name, token) in self.config.input_token.iter().zip(tokens) {
                        if let Some(token) = token {
                            map.insert(name.clone(), token.clone());
                        }
                    }
                }
                parameters
            }
        };

        let outcome = self.client.call(&self.model.name, parameters).await;
        let CallOutput { output: page, .. } = match outcome {
            Ok(output) => output,
            Err(err) => {
                self.state = PageState::Done;
                return Some(Err(err));
            }
        };

        self.state = self.advance(&page);
        Some(Ok(page))
    }

    /// Compute the follow-up state from a page's continuation fields.
    fn advance(&self, page: &Value) -> PageState {
        if let Some(flag_path) = &self.config.more_results {
            let truncated = resolve(page, flag_path)
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !truncated {
                return PageState::Done;
            }
        }

        let tokens: Vec<Option<Value>> = self
            .config
            .output_token
            .iter()
            .map(|path| {
                let token = resolve(page, path);
                is_present_token(token).then(|| token.cloned()).flatten()
            })
            .collect();

        if tokens.iter().any(Option::is_some) {
            tracing::debug!(operation = %self.model.name, "continuing pagination");
            PageState::Cursor(tokens)
        } else {
            PageState::Done
        }
    }

    /// Result-set elements of one page, in declared result-key order.
    ///
    /// A page missing its result key yields no elements; that is an empty
    /// page, not an error.
    fn page_items(config: &PaginationConfig, page: &Value) -> Vec<Value> {
        let mut items = Vec::new();
        for key in &config.result_key {
            for value in crate::model::paths::resolve_collection(page, key) {
                match value {
                    Value::Array(elements) => items.extend(elements),
                    other => items.push(other),
                }
            }
        }
        items
    }

    /// Adapt the page sequence into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = AwsResult<Value>> {
        stream::unfold(self, |mut paginator| async move {
            let page = paginator.next_page().await?;
            Some((page, paginator))
        })
    }
}

/// Lazy sequence of result-set elements, flattened across pages.
///
/// A thin projection over [`Paginator`]: the only extra state is the
/// read cursor into the current page.
#[derive(Debug)]
pub struct ItemPaginator {
    pages: Paginator,
    buffer: VecDeque<Value>,
}

impl ItemPaginator {
    pub(crate) fn new(
        client: Client,
        model: Arc<OperationModel>,
        parameters: Value,
    ) -> AwsResult<Self> {
        Ok(Self {
            pages: Paginator::new(client, model, parameters)?,
            buffer: VecDeque::new(),
        })
    }

    /// Fetch the next element, pulling pages as needed.
    pub async fn next_item(&mut self) -> Option<AwsResult<Value>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            match self.pages.next_page().await? {
                Ok(page) => {
                    self.buffer
                        .extend(Paginator::page_items(&self.pages.config, &page));
                    // An empty page just means the next pull fetches again.
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// Adapt the element sequence into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = AwsResult<Value>> {
        stream::unfold(self, |mut items| async move {
            let item = items.next_item().await?;
            Some((item, items))
        })
    }
}
