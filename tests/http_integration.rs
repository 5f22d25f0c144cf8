//! Integration tests for the Phish.net client using wiremock
//!
//! These tests run the real client against mocked endpoints to check
//! status handling, envelope errors, and the query string it sends.

use phishnet::models::{Show, Song, User, Venue};
use phishnet::{ClientConfig, Error, PhishNetClient, QueryParams, QueryableColumn, ResourceKind};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn client_for(server: &MockServer) -> PhishNetClient {
    let config = ClientConfig::new(API_KEY).with_base_url(server.uri());
    PhishNetClient::new(config).expect("client should build")
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "error": false, "error_message": "", "data": data })
}

mod status_handling_tests {
    use super::*;

    /// Test successful list request decodes every item
    #[tokio::test]
    async fn test_list_success_decodes_items() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shows.json"))
            .and(query_param("apikey", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"showid": 1, "showdate": "1997-11-22", "venue": "Hampton Coliseum"},
                {"showid": 2, "showdate": "1997-11-23"}
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let shows: Vec<Show> = client_for(&server)
            .list(QueryParams::new(), &CancellationToken::new())
            .await
            .expect("request should succeed");

        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].id, 1);
        assert_eq!(shows[0].venue.as_deref(), Some("Hampton Coliseum"));
        assert_eq!(shows[1].show_date, "1997-11-23");
    }

    /// Test 404 on a list returns an empty result, not an error
    #[tokio::test]
    async fn test_404_list_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/venues.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let venues: Vec<Venue> = client_for(&server)
            .list(QueryParams::new(), &CancellationToken::new())
            .await
            .expect("404 should not be an error");

        assert!(venues.is_empty());
    }

    /// Test 404 on an id lookup is reported as absence
    #[tokio::test]
    async fn test_404_by_id_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/songs/999.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let song: Option<Song> = client_for(&server)
            .get(999, QueryParams::new(), &CancellationToken::new())
            .await
            .expect("404 should not be an error");

        assert!(song.is_none());
    }

    /// Test id lookup takes the first item of the data array
    #[tokio::test]
    async fn test_by_id_takes_first_item() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/songs/42.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"songid": 42, "song": "Tweezer", "slug": "tweezer", "times_played": 400},
                {"songid": 43, "song": "Tweezer Reprise", "slug": "tweezer-reprise"}
            ]))))
            .mount(&server)
            .await;

        let song: Song = client_for(&server)
            .get(42, QueryParams::new(), &CancellationToken::new())
            .await
            .unwrap()
            .expect("song should be found");

        assert_eq!(song.id, 42);
        assert_eq!(song.slug, "tweezer");
        assert_eq!(song.times_played, 400);
    }

    /// Test 500 response is a transport error carrying the reason
    #[tokio::test]
    async fn test_500_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/artists.json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_all::<serde_json::Value>(
                ResourceKind::Artists,
                QueryParams::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            Error::Transport { status, reason, .. } => {
                assert_eq!(status, Some(500));
                assert_eq!(reason, "Internal Server Error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    /// Test 401 response is a transport error, not an empty result
    #[tokio::test]
    async fn test_401_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shows.json"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list::<Show>(QueryParams::new(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
    }
}

mod envelope_tests {
    use super::*;

    /// Test an error envelope on a 200 surfaces as an API error with code
    #[tokio::test]
    async fn test_error_envelope_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shows.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"error": 1, "error_message": "bad key"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list::<Show>(QueryParams::new(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            Error::Api { message, code } => {
                assert_eq!(message, "bad key");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    /// Test a non-JSON body is a decode error
    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shows.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list::<Show>(QueryParams::new(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }
}

mod request_shape_tests {
    use super::*;

    /// Test list parameters are sent only when set
    #[tokio::test]
    async fn test_query_string_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shows.json"))
            .and(query_param("apikey", API_KEY))
            .and(query_param("order_by", "showdate"))
            .and(query_param("direction", "desc"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let params = QueryParams::new().order_by("showdate").descending().limit(3);
        let shows: Vec<Show> = client_for(&server)
            .list(params, &CancellationToken::new())
            .await
            .unwrap();

        assert!(shows.is_empty());
    }

    /// Test ascending order omits the direction parameter
    #[tokio::test]
    async fn test_ascending_omits_direction() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shows.json"))
            .and(query_param_is_missing("direction"))
            .and(query_param_is_missing("limit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let _: Vec<Show> = client_for(&server)
            .list(QueryParams::new().order_by("showdate"), &CancellationToken::new())
            .await
            .unwrap();
    }

    /// Test caller-supplied keys are replaced by the configured one
    #[tokio::test]
    async fn test_configured_key_wins() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/venues/3.json"))
            .and(query_param("apikey", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"venueid": 3, "venuename": "Madison Square Garden"}
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let params = QueryParams {
            api_key: Some("someone-elses-key".to_string()),
            ..QueryParams::default()
        };
        let venue: Option<Venue> = client_for(&server)
            .get(3, params, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(venue.unwrap().name, "Madison Square Garden");
    }

    /// Test user lookup by username resolves to a single account
    #[tokio::test]
    async fn test_find_user_by_username() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/username/harpua.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"uid": 12, "username": "harpua", "date_joined": "2001-08-01"}
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let user: Option<User> = client_for(&server)
            .find(
                QueryableColumn::Username,
                "harpua",
                QueryParams::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(user.map(|u| u.id), Some(12));
    }

    /// Test unsupported lookups never reach the server
    #[tokio::test]
    async fn test_unsupported_lookup_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .query::<User>(
                QueryableColumn::Slug,
                "tweezer",
                QueryParams::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
    }
}

mod cancellation_tests {
    use super::*;

    /// Test cancelling the token aborts a slow request
    #[tokio::test]
    async fn test_cancel_aborts_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shows.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(json!([])))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client_for(&server)
            .list::<Show>(QueryParams::new(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
    }

    /// Test the configured timeout yields a transport error
    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/shows.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(json!([])))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new(API_KEY)
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(100));
        let err = PhishNetClient::new(config)
            .unwrap()
            .list::<Show>(QueryParams::new(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport { status: None, .. }));
    }
}
