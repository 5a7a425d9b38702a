//! Permission catalog and the authorization checks built on it.
//!
//! A user's permissions are the names attached to their role. Admins and
//! superusers bypass every check.

use crate::error::ApiError;
use crate::middleware::AuthUser;

// User
pub const CAN_MANAGE_USER: &str = "manage_user";
pub const CAN_CREATE_USER: &str = "create_user";
pub const CAN_EDIT_USER: &str = "edit_user";
pub const CAN_DELETE_USER: &str = "delete_user";

// Document
pub const CAN_MANAGE_DOCUMENT: &str = "manage_document";
pub const CAN_CREATE_DOCUMENT: &str = "create_document";
pub const CAN_EDIT_DOCUMENT: &str = "edit_document";
pub const CAN_DELETE_DOCUMENT: &str = "delete_document";
pub const CAN_SHOW_DOCUMENT: &str = "show_document";
pub const CAN_MANAGE_MY_DOCUMENT: &str = "manage_my_document";
pub const CAN_CREATE_MY_DOCUMENT: &str = "create_my_document";
pub const CAN_EDIT_MY_DOCUMENT: &str = "edit_my_document";
pub const CAN_DELETE_MY_DOCUMENT: &str = "delete_my_document";
pub const CAN_SHOW_MY_DOCUMENT: &str = "show_my_document";
pub const CAN_MANAGE_DOCUMENT_HISTORY: &str = "manage_document_history";
pub const CAN_DOWNLOAD_DOCUMENT: &str = "download_document";
pub const CAN_PREVIEW_DOCUMENT: &str = "preview_document";

// Share document
pub const CAN_MANAGE_SHARE_DOCUMENT: &str = "manage_share_document";
pub const CAN_DELETE_SHARE_DOCUMENT: &str = "delete_share_document";
pub const CAN_CREATE_SHARE_DOCUMENT: &str = "create_share_document";

// Reminder
pub const CAN_MANAGE_REMINDER: &str = "manage_reminder";
pub const CAN_CREATE_REMINDER: &str = "create_reminder";
pub const CAN_EDIT_REMINDER: &str = "edit_reminder";
pub const CAN_DELETE_REMINDER: &str = "delete_reminder";
pub const CAN_SHOW_REMINDER: &str = "show_reminder";
pub const CAN_MANAGE_MY_REMINDER: &str = "manage_my_reminder";

// Comment
pub const CAN_MANAGE_COMMENT: &str = "manage_comment";
pub const CAN_CREATE_COMMENT: &str = "create_comment";

// Version
pub const CAN_MANAGE_VERSION: &str = "manage_version";
pub const CAN_CREATE_VERSION: &str = "create_version";

// Email & mail
pub const CAN_MANAGE_EMAIL_SETTINGS: &str = "manage_email_settings";
pub const CAN_MANAGE_MAIL: &str = "manage_mail";
pub const CAN_SEND_MAIL: &str = "send_mail";

// Category & sub-category
pub const CAN_MANAGE_CATEGORY: &str = "manage_category";
pub const CAN_CREATE_CATEGORY: &str = "create_category";
pub const CAN_EDIT_CATEGORY: &str = "edit_category";
pub const CAN_DELETE_CATEGORY: &str = "delete_category";
pub const CAN_MANAGE_SUB_CATEGORY: &str = "manage_sub_category";
pub const CAN_CREATE_SUB_CATEGORY: &str = "create_sub_category";
pub const CAN_EDIT_SUB_CATEGORY: &str = "edit_sub_category";
pub const CAN_DELETE_SUB_CATEGORY: &str = "delete_sub_category";

// Tag
pub const CAN_MANAGE_TAG: &str = "manage_tag";
pub const CAN_CREATE_TAG: &str = "create_tag";
pub const CAN_EDIT_TAG: &str = "edit_tag";
pub const CAN_DELETE_TAG: &str = "delete_tag";

// Contact
pub const CAN_MANAGE_CONTACT: &str = "manage_contact";
pub const CAN_CREATE_CONTACT: &str = "create_contact";
pub const CAN_EDIT_CONTACT: &str = "edit_contact";
pub const CAN_DELETE_CONTACT: &str = "delete_contact";

// Note
pub const CAN_MANAGE_NOTE: &str = "manage_note";
pub const CAN_CREATE_NOTE: &str = "create_note";
pub const CAN_EDIT_NOTE: &str = "edit_note";
pub const CAN_DELETE_NOTE: &str = "delete_note";

// Logged history
pub const CAN_MANAGE_LOGGED_HISTORY: &str = "manage_logged_history";
pub const CAN_DELETE_LOGGED_HISTORY: &str = "delete_logged_history";

// Settings
pub const CAN_MANAGE_PRICING_TRANSACTION: &str = "manage_pricing_transaction";
pub const CAN_MANAGE_ACCOUNT_SETTINGS: &str = "manage_account_settings";
pub const CAN_MANAGE_PASSWORD_SETTINGS: &str = "manage_password_settings";
pub const CAN_MANAGE_GENERAL_SETTINGS: &str = "manage_general_settings";
pub const CAN_MANAGE_COMPANY_SETTINGS: &str = "manage_company_settings";

/// `(name, label)` pairs seeded into the `permissions` table
pub const PERMISSIONS: &[(&str, &str)] = &[
    (CAN_MANAGE_USER, "Manage user"),
    (CAN_CREATE_USER, "Create user"),
    (CAN_EDIT_USER, "Edit user"),
    (CAN_DELETE_USER, "Delete user"),
    (CAN_MANAGE_DOCUMENT, "Manage document"),
    (CAN_CREATE_DOCUMENT, "Create document"),
    (CAN_EDIT_DOCUMENT, "Edit document"),
    (CAN_DELETE_DOCUMENT, "Delete document"),
    (CAN_SHOW_DOCUMENT, "Show document"),
    (CAN_MANAGE_MY_DOCUMENT, "Manage my document"),
    (CAN_CREATE_MY_DOCUMENT, "Create my document"),
    (CAN_EDIT_MY_DOCUMENT, "Edit my document"),
    (CAN_DELETE_MY_DOCUMENT, "Delete my document"),
    (CAN_SHOW_MY_DOCUMENT, "Show my document"),
    (CAN_MANAGE_DOCUMENT_HISTORY, "Manage document history"),
    (CAN_DOWNLOAD_DOCUMENT, "Download document"),
    (CAN_PREVIEW_DOCUMENT, "Preview document"),
    (CAN_MANAGE_SHARE_DOCUMENT, "Manage share document"),
    (CAN_DELETE_SHARE_DOCUMENT, "Delete share document"),
    (CAN_CREATE_SHARE_DOCUMENT, "Create share document"),
    (CAN_MANAGE_REMINDER, "Manage reminder"),
    (CAN_CREATE_REMINDER, "Create reminder"),
    (CAN_EDIT_REMINDER, "Edit reminder"),
    (CAN_DELETE_REMINDER, "Delete reminder"),
    (CAN_SHOW_REMINDER, "Show reminder"),
    (CAN_MANAGE_MY_REMINDER, "Manage my reminder"),
    (CAN_MANAGE_COMMENT, "Manage comment"),
    (CAN_CREATE_COMMENT, "Create comment"),
    (CAN_MANAGE_VERSION, "Manage version"),
    (CAN_CREATE_VERSION, "Create version"),
    (CAN_MANAGE_EMAIL_SETTINGS, "Manage email settings"),
    (CAN_MANAGE_MAIL, "Manage mail"),
    (CAN_SEND_MAIL, "Send mail"),
    (CAN_MANAGE_CATEGORY, "Manage category"),
    (CAN_CREATE_CATEGORY, "Create category"),
    (CAN_EDIT_CATEGORY, "Edit category"),
    (CAN_DELETE_CATEGORY, "Delete category"),
    (CAN_MANAGE_SUB_CATEGORY, "Manage sub category"),
    (CAN_CREATE_SUB_CATEGORY, "Create sub category"),
    (CAN_EDIT_SUB_CATEGORY, "Edit sub category"),
    (CAN_DELETE_SUB_CATEGORY, "Delete sub category"),
    (CAN_MANAGE_TAG, "Manage tag"),
    (CAN_CREATE_TAG, "Create tag"),
    (CAN_EDIT_TAG, "Edit tag"),
    (CAN_DELETE_TAG, "Delete tag"),
    (CAN_MANAGE_CONTACT, "Manage contact"),
    (CAN_CREATE_CONTACT, "Create contact"),
    (CAN_EDIT_CONTACT, "Edit contact"),
    (CAN_DELETE_CONTACT, "Delete contact"),
    (CAN_MANAGE_NOTE, "Manage note"),
    (CAN_CREATE_NOTE, "Create note"),
    (CAN_EDIT_NOTE, "Edit note"),
    (CAN_DELETE_NOTE, "Delete note"),
    (CAN_MANAGE_LOGGED_HISTORY, "Manage logged history"),
    (CAN_DELETE_LOGGED_HISTORY, "Delete logged history"),
    (CAN_MANAGE_PRICING_TRANSACTION, "Manage pricing transaction"),
    (CAN_MANAGE_ACCOUNT_SETTINGS, "Manage account settings"),
    (CAN_MANAGE_PASSWORD_SETTINGS, "Manage password settings"),
    (CAN_MANAGE_GENERAL_SETTINGS, "Manage general settings"),
    (CAN_MANAGE_COMPANY_SETTINGS, "Manage company settings"),
];

/// True for admins and superusers, otherwise true iff the user holds any of
/// `permissions`. An empty list only admits admins and superusers.
pub fn is_authorized(user: &AuthUser, permissions: &[&str]) -> bool {
    if user.is_superuser || user.is_admin {
        return true;
    }

    permissions
        .iter()
        .any(|required| user.permissions.iter().any(|held| held == required))
}

/// 403 unless [`is_authorized`]
pub fn require(user: &AuthUser, permissions: &[&str]) -> Result<(), ApiError> {
    if is_authorized(user, permissions) {
        Ok(())
    } else {
        tracing::warn!(
            "User {} denied: requires one of {:?}",
            user.id,
            permissions
        );
        Err(ApiError::forbidden("You do not have permission to perform this action"))
    }
}

/// Holders of `any` always pass; holders of `own` pass when they own the resource
pub fn is_authorized_owned(
    user: &AuthUser,
    any: &[&str],
    own: &[&str],
    owner_id: Option<i32>,
) -> bool {
    is_authorized(user, any) || (owner_id == Some(user.id) && is_authorized(user, own))
}

/// Admin/superuser only
pub fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    require(user, &[])
}
