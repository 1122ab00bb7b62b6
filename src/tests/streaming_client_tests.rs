/// Tests for sink-driven streaming through the client
#[cfg(test)]
mod streaming_client_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde_json::{Value, json};

    use crate::error::ClientError;
    use crate::streaming::{DecodeErrorPolicy, DecodedEvent, DecoderOptions, EventSink};
    use crate::tests::{Reply, client_with};

    type Seen = Arc<Mutex<Vec<(Value, String)>>>;

    fn recording_sink() -> (impl FnMut(&Value, &str) + Send + 'static, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let handle = seen.clone();
        let sink = move |value: &Value, raw: &str| {
            handle.lock().unwrap().push((value.clone(), raw.to_string()));
        };
        (sink, seen)
    }

    #[tokio::test]
    async fn sink_sees_objects_split_across_chunks() {
        let (mut client, _transport) =
            client_with(Reply::Chunks(vec![r#"{"a":1}{"b""#, r#":2}"#]));
        let (sink, seen) = recording_sink();

        client.callback(sink).prompt("hi").generate().await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (json!({"a": 1}), r#"{"a":1}"#.to_string()),
                (json!({"b": 2}), r#"{"b":2}"#.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn multi_object_stream_returns_last_event() {
        let (mut client, _transport) = client_with(Reply::Chunks(vec![
            "{\"response\":\"Hel\",\"done\":false}\n{\"resp",
            "onse\":\"lo\",\"done\":false}\n",
            "{\"response\":\"\",\"done\":true,\"eval_count\":2}\n",
        ]));
        let (sink, seen) = recording_sink();

        let value = client.callback(sink).prompt("hi").generate().await.unwrap();

        let text: String = seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(value, _)| value["response"].as_str().map(str::to_string))
            .collect();
        assert_eq!(text, "Hello");
        assert_eq!(value["done"], true);
        assert_eq!(value["eval_count"], 2);

        let stats = client.last_stream().unwrap();
        assert_eq!(stats.events, 3);
        assert!(stats.trailing.is_none());
    }

    #[tokio::test]
    async fn single_object_stream_returns_whole_transcript() {
        let (mut client, _transport) =
            client_with(Reply::Chunks(vec![r#"{"status":"#, r#""success"}"#]));
        let (sink, _seen) = recording_sink();

        let value = client.callback(sink).pull(None, false).await.unwrap();

        assert_eq!(value, json!({"status": "success"}));
    }

    #[tokio::test]
    async fn truncated_stream_reports_trailing_data() {
        let (mut client, _transport) =
            client_with(Reply::Chunks(vec![r#"{"a":1}"#, r#"{"b":"#]));
        let (sink, seen) = recording_sink();

        let value = client.callback(sink).generate().await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(value, json!({"a": 1}));
        let trailing = client.last_stream().unwrap().trailing.clone().unwrap();
        assert_eq!(trailing.text(), r#"{"b":"#);
    }

    #[tokio::test]
    async fn empty_stream_returns_null() {
        let (mut client, _transport) = client_with(Reply::Chunks(vec![]));
        let (sink, seen) = recording_sink();

        let value = client.callback(sink).generate().await.unwrap();

        assert_eq!(value, Value::Null);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_object_aborts_stream() {
        let (mut client, _transport) =
            client_with(Reply::Chunks(vec![r#"{"a":1}{bad}{"c":3}"#]));
        let (sink, seen) = recording_sink();

        let err = client.callback(sink).generate().await.unwrap_err();

        assert!(err.is_decode());
        assert_eq!(err.raw_text(), Some("{bad}"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    struct CountingSink {
        events: Arc<Mutex<usize>>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl EventSink for CountingSink {
        fn on_event(&mut self, _event: &DecodedEvent<'_>) {
            *self.events.lock().unwrap() += 1;
        }

        fn on_decode_error(&mut self, error: &ClientError) {
            self.errors
                .lock()
                .unwrap()
                .push(error.raw_text().unwrap_or_default().to_string());
        }
    }

    #[tokio::test]
    async fn skip_policy_continues_past_malformed_object() {
        let (mut client, _transport) =
            client_with(Reply::Chunks(vec![r#"{"a":1}{bad}{"c":3}"#]));
        let events = Arc::new(Mutex::new(0));
        let errors = Arc::new(Mutex::new(Vec::new()));

        let value = client
            .decoder_options(DecoderOptions {
                error_policy: DecodeErrorPolicy::Skip,
                ..DecoderOptions::default()
            })
            .callback(CountingSink {
                events: events.clone(),
                errors: errors.clone(),
            })
            .generate()
            .await
            .unwrap();

        assert_eq!(*events.lock().unwrap(), 2);
        assert_eq!(*errors.lock().unwrap(), vec!["{bad}".to_string()]);
        assert_eq!(value, json!({"c": 3}));
        assert_eq!(client.last_stream().unwrap().skipped, 1);
    }

    #[tokio::test]
    async fn cancellation_stops_a_stalled_stream() {
        let (mut client, _transport) = client_with(Reply::Stall(vec![r#"{"response":"A"}"#]));
        let (sink, seen) = recording_sink();
        client.callback(sink);

        let token = client.cancellation_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let err = client.generate().await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_client_sends_nothing() {
        let (mut client, transport) = client_with(Reply::Body("{}"));
        client.cancellation_handle().cancel();

        let err = client.list_local_models().await.unwrap_err();

        assert!(err.is_cancelled());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_request_clears_previous_stream_stats() {
        let (mut client, _transport) =
            client_with(Reply::Chunks(vec![r#"{"response":"A","done":true}"#]));
        let (sink, _seen) = recording_sink();

        client.callback(sink).generate().await.unwrap();
        assert_eq!(client.last_stream().unwrap().events, 1);

        let err = client.base_url("ftp://x").generate().await.unwrap_err();

        assert!(err.is_invalid_config());
        assert!(client.last_stream().is_none());
    }

    #[tokio::test]
    async fn whole_body_request_clears_previous_stream_stats() {
        let (mut client, _transport) = client_with(Reply::Chunks(vec![r#"{"a":1}"#, r#"{"b":"#]));
        let (sink, _seen) = recording_sink();

        client.callback(sink).generate().await.unwrap();
        assert!(client.last_stream().unwrap().trailing.is_some());

        client.clear_callback();
        let err = client.generate().await.unwrap_err();

        assert!(err.is_decode());
        assert!(client.last_stream().is_none());
    }

    #[tokio::test]
    async fn clearing_the_callback_restores_whole_body_mode() {
        let (mut client, _transport) = client_with(Reply::Chunks(vec![r#"{"a":"#, "1}"]));
        let (sink, seen) = recording_sink();

        client.callback(sink).clear_callback();
        assert!(!client.has_callback());

        let value = client.generate().await.unwrap();
        assert_eq!(value, json!({"a": 1}));
        assert!(seen.lock().unwrap().is_empty());
    }
}
