//! Account management (Admin only)

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, Uri},
    response::Response,
    routing::get,
    Form, Router,
};
use serde::Serialize;
use tera::Context;

use crate::models::{AccountRole, Pagination, TrashEntity};
use crate::services::AccountService;
use crate::session::{Flash, Session};
use crate::validation::{AccountForm, FormErrors, FormMode};

use crate::web::common::{pager_url, DeleteForm, ListQuery};
use crate::web::error::{is_rejection, WebError};
use crate::web::middleware::{AppState, CurrentSession};
use super::rejected_form;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/new", get(new_form))
        .route("/{id}/edit", get(edit_form).post(update))
        .route("/{id}/delete", get(confirm_delete).post(delete))
}

#[derive(Debug, Serialize)]
struct RoleOption {
    code: i32,
    name: String,
}

fn role_options() -> Vec<RoleOption> {
    AccountRole::ALL
        .into_iter()
        .map(|role| RoleOption {
            code: role.code(),
            name: role.to_string(),
        })
        .collect()
}

async fn list(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let api = state.api_for(&session);
    let page = Pagination::request(query.page, state.config.ui.admin_page_size);
    let accounts = AccountService::new(&api).list(query.keyword(), page).await?;

    let mut context = Context::new();
    context.insert("q", query.keyword());
    context.insert("pagination", &accounts.pagination);
    context.insert("pager_url", &pager_url("/admin/accounts", query.keyword()));
    context.insert("accounts", &accounts);
    state
        .render(Some(&session), &uri, "admin/accounts.html", context)
        .await
}

async fn render_form(
    state: &AppState,
    session: &Session,
    uri: &Uri,
    status: StatusCode,
    target: Option<i64>,
    form: &AccountForm,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let (heading, action) = match target {
        Some(id) => ("Edit account".to_string(), format!("/admin/accounts/{}/edit", id)),
        None => ("New account".to_string(), "/admin/accounts".to_string()),
    };

    let mut context = Context::new();
    context.insert("heading", &heading);
    context.insert("action", &action);
    context.insert("editing", &target.is_some());
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("roles", &role_options());
    state
        .render_with_status(status, Some(session), uri, "admin/account_form.html", context)
        .await
}

async fn new_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, WebError> {
    let form = AccountForm {
        account_role: AccountRole::Staff.code().to_string(),
        ..AccountForm::default()
    };
    render_form(&state, &session, &uri, StatusCode::OK, None, &form, &FormErrors::new()).await
}

async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<AccountForm>,
) -> Result<Response, WebError> {
    let input = match form.validate(FormMode::Create) {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, &uri, StatusCode::BAD_REQUEST, None, &form, &errors).await
        }
    };

    match AccountService::new(&state.api_for(&session)).create(&input).await {
        Ok(account) => {
            tracing::info!(
                admin_id = session.account.account_id,
                id = account.account_id,
                role = %account.account_role,
                "account created"
            );
            Ok(state
                .redirect_with_flash(
                    &session,
                    "/admin/accounts",
                    Flash::success(format!("Account \"{}\" created", account.account_name)),
                )
                .await)
        }
        Err(e) if is_rejection(&e) => {
            let (status, errors) = rejected_form(&e);
            render_form(&state, &session, &uri, status, None, &form, &errors).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn edit_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let account = AccountService::new(&state.api_for(&session)).get(id).await?;
    let form = AccountForm::from(&account);
    render_form(&state, &session, &uri, StatusCode::OK, Some(id), &form, &FormErrors::new()).await
}

async fn update(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Form(form): Form<AccountForm>,
) -> Result<Response, WebError> {
    let input = match form.validate(FormMode::Update) {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, &uri, StatusCode::BAD_REQUEST, Some(id), &form, &errors)
                .await
        }
    };

    match AccountService::new(&state.api_for(&session)).update(id, &input).await {
        Ok(()) => {
            tracing::info!(admin_id = session.account.account_id, id, "account updated");
            Ok(state
                .redirect_with_flash(&session, "/admin/accounts", Flash::success("Account updated"))
                .await)
        }
        Err(e) if is_rejection(&e) => {
            let (status, errors) = rejected_form(&e);
            render_form(&state, &session, &uri, status, Some(id), &form, &errors).await
        }
        Err(e) => Err(e.into()),
    }
}

fn refuse_self_delete(session: &Session, id: i64) -> Result<(), WebError> {
    if session.account.account_id == id {
        return Err(WebError::BadRequest(
            "You cannot delete the account you are signed in with".to_string(),
        ));
    }
    Ok(())
}

async fn confirm_delete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    refuse_self_delete(&session, id)?;
    let account = AccountService::new(&state.api_for(&session)).get(id).await?;
    super::confirm_delete(&state, &session, &uri, TrashEntity::SystemAccount, id, &account.account_name)
        .await
}

async fn delete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, WebError> {
    refuse_self_delete(&session, id)?;
    super::delete(&state, &session, TrashEntity::SystemAccount, id, &form).await
}
