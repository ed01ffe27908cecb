//! The registration page and the endpoint that creates an account.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash, ValidatedPassword,
    auth::{
        Email, User, UserName,
        account::{AccountState, start_session},
        create_user,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base, email_input, form_field,
        loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// Browser-side length check. zxcvbn decides whether a password is strong enough.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

const PASSWORD_MISMATCH_MSG: &str = "Passwords do not match";
const EMAIL_TAKEN_MSG: &str = "An account with this email already exists.";

/// A submitted registration form.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// The registration form field that a problem belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

/// A problem with one field of the registration form.
#[derive(Debug, PartialEq)]
struct FieldError {
    field: Field,
    message: String,
}

impl FieldError {
    fn new(field: Field, message: impl ToString) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

fn registration_form(form: &RegisterForm, error: Option<&FieldError>) -> Markup {
    let message_for = |field: Field| {
        error
            .filter(|error| error.field == field)
            .map(|error| error.message.as_str())
    };

    let name_input = html! {
        input
            id="name"
            name="name"
            type="text"
            placeholder="Your name"
            value=(form.name)
            class=(FORM_TEXT_INPUT_STYLE)
            required
            autofocus;
    };

    let confirm_password_input = html! {
        input
            id="confirm-password"
            name="confirm_password"
            type="password"
            placeholder="••••••••"
            minlength=(PASSWORD_INPUT_MIN_LENGTH)
            class=(FORM_TEXT_INPUT_STYLE)
            required
            autofocus[message_for(Field::ConfirmPassword).is_some()];
    };

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#name, #email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (form_field("name", "Name", name_input, message_for(Field::Name)))
            (email_input(&form.email, message_for(Field::Email)))
            (password_input(&form.password, PASSWORD_INPUT_MIN_LENGTH, message_for(Field::Password)))
            (form_field(
                "confirm-password",
                "Confirm Password",
                confirm_password_input,
                message_for(Field::ConfirmPassword),
            ))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE) {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                "Create Account"
            }

            p class="text-sm text-gray-500 dark:text-gray-400" {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in here" }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form(&RegisterForm::default(), None);

    base("Register", &[], &log_in_register("Create Account", &form)).into_response()
}

/// The validated fields of a registration form.
struct NewAccount {
    name: UserName,
    email: Email,
    password: ValidatedPassword,
}

/// Check each field in the order they appear on the form and stop at the first problem.
fn validate(form: &RegisterForm) -> Result<NewAccount, FieldError> {
    let name = UserName::new(&form.name).map_err(|error| FieldError::new(Field::Name, error))?;
    let email = Email::new(&form.email).map_err(|error| FieldError::new(Field::Email, error))?;
    let password = ValidatedPassword::new(&form.password, &[name.as_ref(), email.as_ref()])
        .map_err(|error| FieldError::new(Field::Password, error))?;

    if form.password != form.confirm_password {
        return Err(FieldError::new(Field::ConfirmPassword, PASSWORD_MISMATCH_MSG));
    }

    Ok(NewAccount {
        name,
        email,
        password,
    })
}

/// Why an account could not be created.
enum RegistrationFailure {
    /// Shown next to the field.
    Field(FieldError),
    /// Already logged.
    Internal,
}

fn create_account(
    state: &AccountState,
    account: NewAccount,
    password_cost: u32,
) -> Result<User, RegistrationFailure> {
    let password_hash = PasswordHash::new(account.password, password_cost).map_err(|error| {
        tracing::error!("Could not hash password: {error}");
        RegistrationFailure::Internal
    })?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not lock the database: {error}");
        RegistrationFailure::Internal
    })?;

    match create_user(account.name, account.email, password_hash, &connection) {
        Ok(user) => Ok(user),
        Err(Error::DuplicateEmail) => Err(RegistrationFailure::Field(FieldError::new(
            Field::Email,
            EMAIL_TAKEN_MSG,
        ))),
        Err(error) => {
            tracing::error!("Could not create user: {error}");
            Err(RegistrationFailure::Internal)
        }
    }
}

/// Create an account, log the new user in and send them to the dashboard.
///
/// A problem with the form is shown next to the field it belongs to.
pub async fn register_user(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let account = match validate(&form) {
        Ok(account) => account,
        Err(error) => return registration_form(&form, Some(&error)).into_response(),
    };

    let local_offset = match state.local_offset() {
        Ok(offset) => offset,
        Err(error) => return error.into_response(),
    };

    let user = match create_account(&state, account, PasswordHash::DEFAULT_COST) {
        Ok(user) => user,
        Err(RegistrationFailure::Field(error)) => {
            return registration_form(&form, Some(&error)).into_response();
        }
        Err(RegistrationFailure::Internal) => return get_internal_server_error_redirect(),
    };

    tracing::info!("Registered user {}", user.id);

    start_session(
        jar,
        user.id,
        state.cookie_duration,
        local_offset,
        endpoints::DASHBOARD_VIEW,
    )
}
