use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Endereco {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub rua: String,
    #[serde(default)]
    pub numero: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub estado: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pessoa {
    pub id_pessoa: String,
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: String,
    pub endereco: Endereco,
}

/// Body of `POST /pessoa`. A known `idPessoa` updates, anything else creates.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalvarPessoa {
    pub id_pessoa: Option<String>,
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: String,
    #[serde(default)]
    pub endereco: Endereco,
}

/// Insertion-ordered store; list responses keep that order.
pub type Db = Arc<RwLock<Vec<Pessoa>>>;

/// Postal codes the lookup route knows about: (cep, logradouro, localidade, uf).
const CEPS: &[(&str, &str, &str, &str)] = &[
    ("01001000", "Praça da Sé", "São Paulo", "SP"),
    ("20040020", "Avenida Rio Branco", "Rio de Janeiro", "RJ"),
    ("70040010", "Esplanada dos Ministérios", "Brasília", "DF"),
];

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/pessoa", get(listar_pessoas).post(salvar_pessoa))
        .route("/pessoa/{chave}", get(buscar_pessoa).delete(excluir_pessoa))
        .route("/ws/{cep}/json/", get(buscar_cep))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn listar_pessoas(State(db): State<Db>) -> Json<Vec<Pessoa>> {
    Json(db.read().await.clone())
}

async fn salvar_pessoa(
    State(db): State<Db>,
    Json(input): Json<SalvarPessoa>,
) -> (StatusCode, Json<Pessoa>) {
    let mut pessoas = db.write().await;
    let existente = input
        .id_pessoa
        .as_ref()
        .and_then(|id| pessoas.iter().position(|p| &p.id_pessoa == id));

    let pessoa = Pessoa {
        id_pessoa: match existente {
            Some(index) => pessoas[index].id_pessoa.clone(),
            None => Uuid::new_v4().to_string(),
        },
        nome: input.nome,
        cpf: input.cpf,
        data_nascimento: input.data_nascimento,
        endereco: input.endereco,
    };

    match existente {
        Some(index) => {
            tracing::info!(id = %pessoa.id_pessoa, "pessoa atualizada");
            pessoas[index] = pessoa.clone();
            (StatusCode::OK, Json(pessoa))
        }
        None => {
            tracing::info!(id = %pessoa.id_pessoa, "pessoa criada");
            pessoas.push(pessoa.clone());
            (StatusCode::CREATED, Json(pessoa))
        }
    }
}

/// `chave` is either an id or a CPF.
async fn buscar_pessoa(
    State(db): State<Db>,
    Path(chave): Path<String>,
) -> Result<Json<Pessoa>, StatusCode> {
    let pessoas = db.read().await;
    pessoas
        .iter()
        .find(|p| p.id_pessoa == chave || p.cpf == chave)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn excluir_pessoa(State(db): State<Db>, Path(id): Path<String>) -> StatusCode {
    let mut pessoas = db.write().await;
    let antes = pessoas.len();
    pessoas.retain(|p| p.id_pessoa != id);
    if pessoas.len() == antes {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

/// ViaCEP-compatible lookup: 400 for malformed codes, `{"erro": true}` for
/// unknown ones.
async fn buscar_cep(Path(cep): Path<String>) -> Result<Json<Value>, StatusCode> {
    if cep.len() != 8 || !cep.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let reply = match CEPS.iter().find(|(codigo, ..)| *codigo == cep) {
        Some((codigo, logradouro, localidade, uf)) => json!({
            "cep": format!("{}-{}", &codigo[..5], &codigo[5..]),
            "logradouro": logradouro,
            "localidade": localidade,
            "uf": uf,
        }),
        None => json!({ "erro": true }),
    };
    Ok(Json(reply))
}
