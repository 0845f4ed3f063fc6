//! Poll-evaluate-notify loop for homework statuses

use compact_str::{CompactString, format_compact};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use super::{api::HomeworkApi, config::PollingConfig, telegram::Notifier};
use crate::{
    domain::{Cursor, check_response, parse_status},
    notice_service::{NoticeLevel, NoticeService},
    result::{BotError, Result},
};

/// Polls the homework API and relays status changes and failures.
///
/// Owns all loop state: the cursor and the last message sent per level.
#[derive(Debug)]
pub struct HomeworkPoller<N> {
    api: HomeworkApi,
    notifier: N,
    config: PollingConfig,
    notices: NoticeService,
    cursor: Cursor,
}

impl<N: Notifier> HomeworkPoller<N> {
    pub fn new(api: HomeworkApi, notifier: N, config: PollingConfig, cursor: Cursor) -> Self {
        Self {
            api,
            notifier,
            config,
            notices: NoticeService::new(),
            cursor,
        }
    }

    /// Poll forever, sleeping the retry period after every cycle
    pub async fn run(mut self) {
        info!(
            retry_period = ?self.config.retry_period,
            advance_cursor = self.config.advance_cursor,
            from_date = %self.cursor,
            "Starting homework poller"
        );

        loop {
            self.poll_once().await;
            debug!(retry_period = ?self.config.retry_period, "Sleeping until next poll");
            sleep(self.config.retry_period).await;
        }
    }

    /// One poll cycle without the trailing sleep
    #[instrument(skip(self), fields(from_date = %self.cursor))]
    pub async fn poll_once(&mut self) {
        match self.latest_status().await {
            Ok(message) => {
                if self.notices.push_notice(NoticeLevel::Info, &message) {
                    info!(text = %message, "Homework status changed");
                    self.notifier.notify(&message).await;
                } else {
                    debug!("Homework status unchanged");
                }
            },
            Err(e) => {
                let message = failure_message(&e);
                error!(kind = e.kind(), status = ?status_of(&e), "{message}");
                if self.notices.push_notice(NoticeLevel::Error, &message) {
                    self.notifier.notify(&message).await;
                } else {
                    debug!("Same failure already reported");
                }
            },
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[cfg(test)]
    pub fn notices(&self) -> &NoticeService {
        &self.notices
    }

    async fn latest_status(&mut self) -> Result<CompactString> {
        let response = self.api.fetch(self.cursor).await?;

        if self.config.advance_cursor
            && let Some(current_date) = response.current_date()
        {
            debug!(from = %self.cursor, to = %current_date, "Advancing cursor");
            self.cursor = current_date;
        }

        let homework = check_response(&response)?;
        parse_status(&homework)
    }
}

pub fn failure_message(error: &BotError) -> CompactString {
    format_compact!("Failure in program operation: {error}")
}

fn status_of(error: &BotError) -> Option<u16> {
    match error {
        BotError::Client(e) => e.status().map(|s| s.as_u16()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, query_param},
    };

    use super::*;
    use crate::client::config::ClientConfig;

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for &RecordingNotifier {
        async fn notify(&self, message: &str) {
            self.sent.lock().unwrap().push(message.to_string());
        }
    }

    fn poller<'a>(
        server: &MockServer,
        notifier: &'a RecordingNotifier,
        advance_cursor: bool,
    ) -> HomeworkPoller<&'a RecordingNotifier> {
        let api = HomeworkApi::new(ClientConfig::new(server.uri(), "token")).unwrap();
        let config = PollingConfig { advance_cursor, ..PollingConfig::default() };
        HomeworkPoller::new(api, notifier, config, Cursor::new(1_700_000_000))
    }

    fn homeworks(status: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "homeworks": [{"status": status, "homework_name": "hw1"}],
            "current_date": 1_700_000_600
        }))
    }

    #[tokio::test]
    async fn status_change_is_notified() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(homeworks("approved")).mount(&server).await;

        let notifier = RecordingNotifier::default();
        poller(&server, &notifier, false).poll_once().await;

        assert_eq!(
            notifier.sent(),
            vec![
                "Changed review status of work \"hw1\". Work reviewed: reviewer liked everything. Hooray!"
            ]
        );
    }

    #[tokio::test]
    async fn unchanged_status_is_notified_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(homeworks("reviewing")).mount(&server).await;

        let notifier = RecordingNotifier::default();
        let mut poller = poller(&server, &notifier, false);
        poller.poll_once().await;
        poller.poll_once().await;

        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn new_status_is_notified_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(homeworks("reviewing"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET")).respond_with(homeworks("rejected")).mount(&server).await;

        let notifier = RecordingNotifier::default();
        let mut poller = poller(&server, &notifier, false);
        poller.poll_once().await;
        poller.poll_once().await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].ends_with("Work reviewed: reviewer has comments."));
    }

    #[tokio::test]
    async fn unavailable_api_is_reported_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

        let notifier = RecordingNotifier::default();
        let mut poller = poller(&server, &notifier, false);
        poller.poll_once().await;

        assert_eq!(
            notifier.sent(),
            vec!["Failure in program operation: API responded with unexpected status"]
        );
        assert_eq!(
            poller.notices().last_notice(NoticeLevel::Error),
            Some("Failure in program operation: API responded with unexpected status")
        );
    }

    #[tokio::test]
    async fn repeated_failure_is_notified_once_until_it_changes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"homeworks": []})))
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut poller = poller(&server, &notifier, false);
        poller.poll_once().await;
        poller.poll_once().await;
        assert_eq!(notifier.sent().len(), 1);

        poller.poll_once().await;
        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1], "Failure in program operation: No homework in the API response");
    }

    #[tokio::test]
    async fn errors_and_statuses_are_deduplicated_separately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(homeworks("approved"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET")).respond_with(homeworks("approved")).mount(&server).await;

        let notifier = RecordingNotifier::default();
        let mut poller = poller(&server, &notifier, false);
        for _ in 0..3 {
            poller.poll_once().await;
        }

        // Status is back to what was last reported, so only two messages go out
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn unknown_status_is_reported_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(homeworks("lost")).mount(&server).await;

        let notifier = RecordingNotifier::default();
        poller(&server, &notifier, false).poll_once().await;

        assert_eq!(
            notifier.sent(),
            vec!["Failure in program operation: Unknown homework status: lost"]
        );
    }

    #[tokio::test]
    async fn cursor_stays_put_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("from_date", "1700000000"))
            .respond_with(homeworks("approved"))
            .expect(2)
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut poller = poller(&server, &notifier, false);
        poller.poll_once().await;
        poller.poll_once().await;

        assert_eq!(poller.cursor(), Cursor::new(1_700_000_000));
    }

    #[tokio::test]
    async fn cursor_follows_current_date_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("from_date", "1700000000"))
            .respond_with(homeworks("approved"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("from_date", "1700000600"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "homeworks": [],
                "current_date": 1_700_001_200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut poller = poller(&server, &notifier, true);
        poller.poll_once().await;
        poller.poll_once().await;

        assert_eq!(poller.cursor(), Cursor::new(1_700_001_200));
    }

    #[tokio::test]
    async fn run_polls_again_only_after_retry_period() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET")).respond_with(homeworks("approved")).mount(&server).await;

        let notifier = RecordingNotifier::default();
        let retry_period = Duration::from_millis(400);
        let api = HomeworkApi::new(ClientConfig::new(server.uri(), "token")).unwrap();
        let config = PollingConfig { retry_period, advance_cursor: false };
        let run = HomeworkPoller::new(api, &notifier, config, Cursor::new(1_700_000_000)).run();
        tokio::pin!(run);

        tokio::select! {
            _ = &mut run => unreachable!("poll loop never returns"),
            _ = sleep(retry_period / 2) => {},
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
        assert_eq!(
            notifier.sent(),
            vec!["Failure in program operation: API responded with unexpected status"]
        );

        tokio::select! {
            _ = &mut run => unreachable!("poll loop never returns"),
            _ = sleep(retry_period) => {},
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].starts_with("Changed review status of work \"hw1\"."));
    }
}
