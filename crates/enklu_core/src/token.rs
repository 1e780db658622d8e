//! Async tokens - results produced off the tick thread
//!
//! A worker holds a [`TokenSource`] and completes it from any thread; the
//! owner holds the [`AsyncToken`] and polls it once per tick. Completions are
//! therefore only ever observed on the tick thread, at the point the owner
//! chooses.
//!
//! Aborting (or dropping) a token closes the channel. The worker can see
//! this through [`TokenSource::is_aborted`] and stop early; anything it
//! sends afterwards is discarded.

use crate::error::{CoreError, Result};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Outcome of polling a token
#[derive(Debug)]
pub enum TokenPoll<T> {
    /// Not completed yet (or already consumed)
    Pending,
    /// Completed; the value is handed out exactly once
    Ready(Result<T>),
}

enum TokenState<T> {
    Waiting(oneshot::Receiver<Result<T>>),
    Finished,
    Aborted,
}

/// Consumer side of an asynchronous operation
pub struct AsyncToken<T> {
    state: TokenState<T>,
}

/// Producer side of an asynchronous operation
pub struct TokenSource<T> {
    sender: oneshot::Sender<Result<T>>,
}

/// Create a connected source/token pair
pub fn pair<T>() -> (TokenSource<T>, AsyncToken<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        TokenSource { sender },
        AsyncToken {
            state: TokenState::Waiting(receiver),
        },
    )
}

impl<T> AsyncToken<T> {
    /// A token that is already resolved with `value`
    pub fn ready(value: T) -> Self {
        let (source, token) = pair();
        source.succeed(value);
        token
    }

    /// A token that already failed
    pub fn failed(error: CoreError) -> Self {
        let (source, token) = pair();
        source.fail(error);
        token
    }

    /// Check for completion without blocking
    pub fn poll(&mut self) -> TokenPoll<T> {
        let TokenState::Waiting(receiver) = &mut self.state else {
            return TokenPoll::Pending;
        };

        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return TokenPoll::Pending,
            Err(TryRecvError::Closed) => Err(CoreError::Abandoned),
        };
        self.state = TokenState::Finished;
        TokenPoll::Ready(result)
    }

    /// Cancel the operation; no completion will be observed afterwards
    pub fn abort(&mut self) {
        if let TokenState::Waiting(receiver) = &mut self.state {
            receiver.close();
            self.state = TokenState::Aborted;
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TokenState::Waiting(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.state, TokenState::Aborted)
    }
}

impl<T> std::fmt::Debug for AsyncToken<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            TokenState::Waiting(_) => "waiting",
            TokenState::Finished => "finished",
            TokenState::Aborted => "aborted",
        };
        f.debug_struct("AsyncToken").field("state", &state).finish()
    }
}

impl<T> TokenSource<T> {
    /// Resolve the token; returns false if it was aborted
    pub fn succeed(self, value: T) -> bool {
        self.sender.send(Ok(value)).is_ok()
    }

    /// Fail the token; returns false if it was aborted
    pub fn fail(self, error: CoreError) -> bool {
        self.sender.send(Err(error)).is_ok()
    }

    /// Complete from a `Result`
    pub fn complete(self, result: Result<T>) -> bool {
        self.sender.send(result).is_ok()
    }

    /// Whether the consumer gave up on this operation
    pub fn is_aborted(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_pending_until_completed() {
        let (source, mut token) = pair::<u32>();
        assert!(matches!(token.poll(), TokenPoll::Pending));
        assert!(token.is_pending());

        assert!(source.succeed(7));
        match token.poll() {
            TokenPoll::Ready(Ok(value)) => assert_eq!(value, 7),
            other => panic!("unexpected {:?}", other),
        }

        // Value is handed out once
        assert!(matches!(token.poll(), TokenPoll::Pending));
        assert!(!token.is_pending());
    }

    #[test]
    fn test_completed_from_worker_thread() {
        let (source, mut token) = pair::<Vec<u8>>();
        let worker = thread::spawn(move || {
            source.succeed(vec![1, 2, 3]);
        });
        worker.join().unwrap();

        match token.poll() {
            TokenPoll::Ready(Ok(bytes)) => assert_eq!(bytes, vec![1, 2, 3]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_abort_discards_late_completion() {
        let (source, mut token) = pair::<u32>();
        token.abort();
        assert!(token.is_aborted());
        assert!(source.is_aborted());

        assert!(!source.succeed(1));
        assert!(matches!(token.poll(), TokenPoll::Pending));
    }

    #[test]
    fn test_dropped_source_fails_token() {
        let (source, mut token) = pair::<u32>();
        drop(source);
        assert!(matches!(
            token.poll(),
            TokenPoll::Ready(Err(CoreError::Abandoned))
        ));
    }

    #[test]
    fn test_prebuilt_tokens() {
        let mut ok = AsyncToken::ready("done");
        assert!(matches!(ok.poll(), TokenPoll::Ready(Ok("done"))));

        let mut failed = AsyncToken::<()>::failed(CoreError::Other("offline".into()));
        assert!(matches!(failed.poll(), TokenPoll::Ready(Err(CoreError::Other(_)))));
    }
}
