//! Tests for the views export pipeline

use std::time::Duration;

use channel_views::commands::{export_ranked_links, ExportOptions};
use channel_views::{ChannelRef, Error, HistoryEntry, HistoryPage, Message, ResolvedPeer};
use tempfile::tempdir;

use super::mock::{empty_page, page, MockClient, RecordingSleeper, NEWS};

fn options_in(dir: &std::path::Path) -> ExportOptions {
    ExportOptions {
        output: dir.join("views.txt"),
        ..Default::default()
    }
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("output file")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_end_to_end_two_pages() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    let client = MockClient::channel(vec![
        page(&[(10, 1), (9, 5)]),
        page(&[(8, 2)]),
        empty_page(),
    ]);
    let sleeper = RecordingSleeper::default();

    let summary = export_ranked_links(&client, &sleeper, "news", &options)
        .await
        .unwrap();

    assert_eq!(summary.channel, "news");
    assert_eq!(summary.messages, 3);
    assert_eq!(summary.output, options.output);
    assert_eq!(
        read_lines(&options.output),
        vec![
            "https://t.me/news/9",
            "https://t.me/news/8",
            "https://t.me/news/10"
        ]
    );
    let offsets: Vec<i32> = client.page_requests.borrow().iter().map(|r| r.0).collect();
    assert_eq!(offsets, vec![0, 9, 8]);
}

#[tokio::test]
async fn test_n_pages_cost_n_plus_one_requests() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    let client = MockClient::channel(vec![
        page(&[(20, 1), (19, 1), (18, 1)]),
        Ok(HistoryPage::new(
            vec![
                HistoryEntry::Message(Message::new(17, 4)),
                HistoryEntry::Service { id: 16 },
                HistoryEntry::Message(Message::new(15, 2)),
            ],
            10,
        )),
        page(&[(14, 0)]),
        page(&[(13, 7), (12, 3)]),
        empty_page(),
    ]);
    let sleeper = RecordingSleeper::default();

    let summary = export_ranked_links(&client, &sleeper, "news", &options)
        .await
        .unwrap();

    assert_eq!(summary.messages, 3 + 2 + 1 + 2);
    assert_eq!(client.request_count(), 5);
    assert_eq!(read_lines(&options.output).len(), 8);
}

#[tokio::test]
async fn test_flood_wait_is_waited_out() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    let client = MockClient::channel(vec![
        Err(Error::FloodWait { seconds: 3 }),
        page(&[(2, 5), (1, 50)]),
        empty_page(),
    ]);
    let sleeper = RecordingSleeper::default();

    let summary = export_ranked_links(&client, &sleeper, "news", &options)
        .await
        .unwrap();

    assert_eq!(summary.messages, 2);
    assert!(sleeper.slept.borrow().contains(&Duration::from_secs(3)));
    assert!(sleeper.total() >= Duration::from_secs(3));
    let offsets: Vec<i32> = client.page_requests.borrow().iter().map(|r| r.0).collect();
    assert_eq!(offsets, vec![0, 0, 1]);
    assert_eq!(
        read_lines(&options.output),
        vec!["https://t.me/news/1", "https://t.me/news/2"]
    );
}

#[tokio::test]
async fn test_timeout_retries_after_fixed_delay() {
    let dir = tempdir().unwrap();
    let options = ExportOptions {
        timeout_retry: Duration::from_millis(1500),
        ..options_in(dir.path())
    };
    let client = MockClient::channel(vec![Err(Error::Timeout), page(&[(1, 1)]), empty_page()]);
    let sleeper = RecordingSleeper::default();

    export_ranked_links(&client, &sleeper, "news", &options)
        .await
        .unwrap();

    assert!(sleeper
        .slept
        .borrow()
        .contains(&Duration::from_millis(1500)));
}

#[tokio::test]
async fn test_channel_not_found_skips_fetch_and_write() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    let client = MockClient::new(None, vec![page(&[(1, 1)])]);
    let sleeper = RecordingSleeper::default();

    let err = export_ranked_links(&client, &sleeper, "ghost", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ChannelNotFound(ref name) if name == "ghost"));
    assert_eq!(client.resolve_calls.get(), 1);
    assert_eq!(client.request_count(), 0);
    assert!(!options.output.exists());
}

#[tokio::test]
async fn test_user_is_rejected_as_wrong_kind() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    let client = MockClient::new(Some(ResolvedPeer::User), vec![]);
    let sleeper = RecordingSleeper::default();

    let err = export_ranked_links(&client, &sleeper, "durov", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotAChannel { kind: "user", .. }));
    assert_eq!(client.request_count(), 0);
    assert!(!options.output.exists());
}

#[tokio::test]
async fn test_group_is_rejected_as_wrong_kind() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    let client = MockClient::new(Some(ResolvedPeer::Group), vec![]);
    let sleeper = RecordingSleeper::default();

    let err = export_ranked_links(&client, &sleeper, "somegroup", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotAChannel { kind: "group", .. }));
}

#[tokio::test]
async fn test_fatal_error_leaves_previous_output_untouched() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    std::fs::write(&options.output, "https://t.me/news/1\n").unwrap();
    let client = MockClient::channel(vec![
        page(&[(5, 1)]),
        Err(Error::TelegramError("CHANNEL_PRIVATE".into())),
    ]);
    let sleeper = RecordingSleeper::default();

    let err = export_ranked_links(&client, &sleeper, "news", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TelegramError(_)));
    assert_eq!(
        std::fs::read_to_string(&options.output).unwrap(),
        "https://t.me/news/1\n"
    );
}

#[tokio::test]
async fn test_leading_at_is_stripped() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    let client = MockClient::channel(vec![page(&[(7, 1)]), empty_page()]);
    let sleeper = RecordingSleeper::default();

    let summary = export_ranked_links(&client, &sleeper, "@news", &options)
        .await
        .unwrap();

    assert_eq!(summary.channel, "news");
    assert_eq!(*client.resolved.borrow(), vec!["news".to_string()]);
    assert_eq!(read_lines(&options.output), vec!["https://t.me/news/7"]);
}

#[tokio::test]
async fn test_options_reach_requests_and_links() {
    let dir = tempdir().unwrap();
    let options = ExportOptions {
        page_limit: 25,
        link_host: "telegram.me".to_string(),
        request_delay: Duration::from_millis(5),
        ..options_in(dir.path())
    };
    let client = MockClient::channel(vec![page(&[(3, 0)]), empty_page()]);
    let sleeper = RecordingSleeper::default();

    export_ranked_links(&client, &sleeper, "news", &options)
        .await
        .unwrap();

    assert!(client
        .page_requests
        .borrow()
        .iter()
        .all(|&(_, limit)| limit == 25));
    assert_eq!(*sleeper.slept.borrow(), vec![Duration::from_millis(5)]);
    assert_eq!(read_lines(&options.output), vec!["https://telegram.me/news/3"]);
}

#[tokio::test]
async fn test_empty_channel_writes_empty_file() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path());
    let client = MockClient::channel(vec![empty_page()]);
    let sleeper = RecordingSleeper::default();

    let summary = export_ranked_links(&client, &sleeper, "news", &options)
        .await
        .unwrap();

    assert_eq!(summary.messages, 0);
    assert_eq!(client.request_count(), 1);
    assert!(sleeper.slept.borrow().is_empty());
    assert_eq!(std::fs::read_to_string(&options.output).unwrap(), "");
}

#[test]
fn test_mock_channel_ref_is_stable() {
    assert_eq!(NEWS, ChannelRef::new(1001, 42));
}
