use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};

fn waldur(server: &Server) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("waldur"));
    cmd.env_remove("WALDUR_API_URL")
        .env_remove("WALDUR_ACCESS_TOKEN")
        .env_remove("REQUESTS_VERIFY_SSL")
        .env_remove("REQUESTS_TIMEOUT")
        .args(["--api-url", &format!("{}/api", server.url())])
        .args(["--token", "secret"]);
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::new(cargo::cargo_bin!("waldur"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("list"))
        .stdout(predicates::str::contains("stats"));
}

#[test]
fn test_missing_token_is_an_error() {
    Command::new(cargo::cargo_bin!("waldur"))
        .env_remove("WALDUR_ACCESS_TOKEN")
        .args(["--api-url", "http://localhost:1/api", "me"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--token"));
}

#[test]
fn test_me_prints_current_user() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/users/me/")
        .match_header("authorization", "token secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"username": "alice", "uuid": "u1"}"#)
        .create();

    waldur(&server)
        .arg("me")
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""username": "alice""#));

    mock.assert();
}

#[test]
fn test_list_passes_filters() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", Matcher::Regex(r"^/api/projects/(\?.*)?$".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name".into(), "Web".into()),
            Matcher::UrlEncoded("page_size".into(), "200".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"name": "Web"}]"#)
        .create();

    waldur(&server)
        .args(["list", "projects", "--filter", "name=Web"])
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""name": "Web""#));

    mock.assert();
}

#[test]
fn test_count_prints_result_count() {
    let mut server = Server::new();
    let _mock = server
        .mock("HEAD", "/api/customers/")
        .with_status(200)
        .with_header("X-Result-Count", "7")
        .create();

    waldur(&server)
        .args(["count", "customers"])
        .assert()
        .success()
        .stdout("7\n");
}

#[test]
fn test_get_unknown_name_fails() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/customers/(\?.*)?$".to_string()))
        .with_status(200)
        .with_body("[]")
        .create();

    waldur(&server)
        .args(["get", "customers", "Nobody"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("failed to get Nobody from customers"))
        .stderr(predicates::str::contains("Result is empty"));
}
