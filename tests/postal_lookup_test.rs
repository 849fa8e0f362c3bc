use cegonha_express::domain::ports::PostalLookup;
use cegonha_express::{ParcelError, ViaCepClient};
use httpmock::prelude::*;
use std::time::Duration;

fn client(server: &MockServer) -> ViaCepClient {
    ViaCepClient::new(&server.url("/ws"), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_lookup_maps_viacep_fields() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/ws/13801005/json/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "cep": "13801-005",
                "logradouro": "Rua Ariovaldo Silveira Franco",
                "complemento": "",
                "bairro": "Jardim 31 de Março",
                "localidade": "Mogi Mirim",
                "uf": "SP",
                "ibge": "3530805"
            }));
    });

    let found = client(&server).lookup("13801-005").await.unwrap().unwrap();

    api_mock.assert();
    assert_eq!(found.postal_code, "13801-005");
    assert_eq!(found.street, "Rua Ariovaldo Silveira Franco");
    assert_eq!(found.neighborhood, "Jardim 31 de Março");
    assert_eq!(found.city, "Mogi Mirim");
    assert_eq!(found.state, "SP");
}

#[tokio::test]
async fn test_lookup_error_flag_means_no_result() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/ws/99999999/json/");
        then.status(200).json_body(serde_json::json!({ "erro": true }));
    });

    let found = client(&server).lookup("99999-999").await.unwrap();

    api_mock.assert();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_lookup_bad_request_means_no_result() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ws/00000000/json/");
        then.status(400);
    });

    assert!(client(&server).lookup("00000-000").await.unwrap().is_none());
}

#[tokio::test]
async fn test_lookup_server_error_is_collaborator_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ws/13801005/json/");
        then.status(503);
    });

    let result = client(&server).lookup("13801-005").await;
    assert!(matches!(result, Err(ParcelError::CollaboratorError { .. })));
}

#[tokio::test]
async fn test_malformed_postal_code_never_hits_the_network() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200);
    });

    let result = client(&server).lookup("123").await;

    assert!(matches!(result, Err(ParcelError::ValidationError { .. })));
    api_mock.assert_hits(0);
}
