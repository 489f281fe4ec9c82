use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Query, State},
    http::{header, HeaderMap},
    Json,
};
use domain::{CommentError, CookedComment, CreateCommentParams, RequestMeta};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::http::{bearer_token, client_ip, error::ApiError, header_str};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<CreateCommentParams>, JsonRejection>,
) -> Result<Json<CookedComment>, ApiError> {
    let Json(params) = payload.map_err(|e| CommentError::Validation(e.body_text()))?;

    let meta = RequestMeta {
        ip: client_ip(
            &headers,
            connect_info.map(|ConnectInfo(addr)| addr),
            state.trust_proxy,
        ),
        user_agent: header_str(&headers, header::USER_AGENT),
        referer: header_str(&headers, header::REFERER),
        token: bearer_token(&headers).or(query.token.filter(|t| !t.is_empty())),
    };

    let cooked = state.pipeline.create(params, meta).await?;
    Ok(Json(cooked))
}
