//! Article handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::metrics::OperationTimer;
use folio_types::{Article, ArticleId, ArticlePage, ArticlePatch, NewArticle, PageQuery};
use tracing::instrument;
use uuid::Uuid;

use super::record_op;
use crate::error::{ApiError, ApiResult};
use crate::extractors::BearerToken;
use crate::state::AppState;

/// GET /articles?page&limit&authorId&publishedAfter
#[instrument(skip(state, query))]
pub async fn list_articles(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<ArticlePage>> {
    let timer = OperationTimer::start("list_articles");
    let result = async {
        let Query(query) = query?;
        Ok::<_, ApiError>(Json(state.folio.list_articles(query).await?))
    }
    .await;
    record_op(timer, &result);
    result
}

/// GET /articles/{id}
#[instrument(skip(state, id))]
pub async fn get_article(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Article>> {
    let timer = OperationTimer::start("get_article");
    let result = async {
        let Path(id) = id?;
        Ok::<_, ApiError>(Json(state.folio.get_article(ArticleId(id)).await?))
    }
    .await;
    record_op(timer, &result);
    result
}

/// POST /articles
#[instrument(skip_all)]
pub async fn create_article(
    State(state): State<AppState>,
    bearer: BearerToken,
    payload: Result<Json<NewArticle>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Article>)> {
    let timer = OperationTimer::start("create_article");
    let result = async {
        let Json(fields) = payload?;
        let article = state
            .folio
            .create_article(fields, bearer.as_deref())
            .await?;
        Ok::<_, ApiError>((StatusCode::CREATED, Json(article)))
    }
    .await;
    record_op(timer, &result);
    result
}

/// PATCH /articles/{id}
#[instrument(skip_all)]
pub async fn update_article(
    State(state): State<AppState>,
    bearer: BearerToken,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ArticlePatch>, JsonRejection>,
) -> ApiResult<Json<Article>> {
    let timer = OperationTimer::start("update_article");
    let result = async {
        let Path(id) = id?;
        let Json(patch) = payload?;
        let article = state
            .folio
            .update_article(ArticleId(id), patch, bearer.as_deref())
            .await?;
        Ok::<_, ApiError>(Json(article))
    }
    .await;
    record_op(timer, &result);
    result
}

/// DELETE /articles/{id}
#[instrument(skip_all)]
pub async fn delete_article(
    State(state): State<AppState>,
    bearer: BearerToken,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let timer = OperationTimer::start("delete_article");
    let result = async {
        let Path(id) = id?;
        state
            .folio
            .delete_article(ArticleId(id), bearer.as_deref())
            .await?;
        Ok::<_, ApiError>(StatusCode::NO_CONTENT)
    }
    .await;
    record_op(timer, &result);
    result
}
