use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use fx_core::accounts::{self, RegisterError, Registration};
use fx_core::AppError;
use fx_ui::{LoginTemplate, RegisterForm, RegisterTemplate};

use crate::error::ApiError;
use crate::forms::{LoginFields, RegisterFields};
use crate::pages;
use crate::session::{removal_cookie, session_cookie, MaybeUser};
use crate::state::AppState;

/// `GET /auth/register`
pub async fn register_form(viewer: MaybeUser) -> Result<Response, ApiError> {
    pages::ok(&RegisterTemplate {
        viewer: viewer.viewer(),
        form: RegisterForm::default(),
    })
}

/// `POST /auth/register`: creates the account and signs it in.
pub async fn register(
    State(state): State<AppState>,
    viewer: MaybeUser,
    jar: CookieJar,
    Form(fields): Form<RegisterFields>,
) -> Result<Response, ApiError> {
    let (username, email) = (fields.username.clone(), fields.email.clone());
    let registration = Registration {
        username: fields.username,
        email: fields.email,
        password: fields.password,
        confirm_password: fields.confirm_password,
    };

    let user = match accounts::register(state.users.as_ref(), state.auth.as_ref(), registration).await {
        Ok(user) => user,
        Err(RegisterError::Rejected(errors)) => {
            return pages::ok(&RegisterTemplate {
                viewer: viewer.viewer(),
                form: RegisterForm::rejected(&username, &email, &errors),
            });
        }
        Err(RegisterError::App(err)) => return Err(err.into()),
    };

    let welcome = accounts::welcome_email(&user, &state.settings.app_name, &state.settings.root_url);
    if let Err(err) = state.mailer.send(welcome).await {
        tracing::warn!(user_id = %user.id, error = %err, "welcome email not sent");
    }

    let jar = jar.add(session_cookie(state.auth.issue_session(user.id)));
    Ok((jar, pages::found("/")).into_response())
}

/// `GET /auth/login`
pub async fn login_form(viewer: MaybeUser) -> Result<Response, ApiError> {
    pages::ok(&LoginTemplate {
        viewer: viewer.viewer(),
        email: String::new(),
        error: String::new(),
    })
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    viewer: MaybeUser,
    jar: CookieJar,
    Form(fields): Form<LoginFields>,
) -> Result<Response, ApiError> {
    match accounts::authenticate(
        state.users.as_ref(),
        state.auth.as_ref(),
        &fields.email,
        &fields.password,
    )
    .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "signed in");
            let jar = jar.add(session_cookie(state.auth.issue_session(user.id)));
            Ok((jar, pages::found("/")).into_response())
        }
        Err(err @ AppError::Unauthorized(_)) => pages::ok(&LoginTemplate {
            viewer: viewer.viewer(),
            email: fields.email,
            error: err.form_message(),
        }),
        Err(err) => Err(err.into()),
    }
}

/// `POST /auth/logout`
pub async fn logout(jar: CookieJar) -> Response {
    (jar.remove(removal_cookie()), pages::found("/")).into_response()
}
