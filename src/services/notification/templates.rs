use super::{NotificationKind, NotificationMessage};
use crate::config::CONFIG;
use crate::models::{restaurant, staff_invitation, user, user::Role};

const SIGNATURE: &str = "\n\n---\nSnapServe";

fn message(
    kind: NotificationKind,
    to: &str,
    to_name: String,
    subject: String,
    body: String,
) -> NotificationMessage {
    NotificationMessage {
        kind,
        recipient: to.to_string(),
        recipient_name: to_name,
        subject,
        body: format!("{}{}", body, SIGNATURE),
    }
}

pub(super) fn staff_invitation(
    invitation: &staff_invitation::Model,
    restaurant: &restaurant::Model,
    invitation_url: &str,
    custom_message: Option<&str>,
) -> NotificationMessage {
    let role = Role::from(invitation.role);
    let mut body = format!(
        "Hello {},\n\nYou have been invited to join {} on SnapServe as a {}.\n\n\
         Accept the invitation and create your account here:\n{}\n\n\
         This invitation expires on {}.",
        invitation.first_name,
        restaurant.name,
        role.label(),
        invitation_url,
        invitation.expires_at.format("%B %-d, %Y at %H:%M UTC"),
    );
    if let Some(note) = custom_message.map(str::trim).filter(|m| !m.is_empty()) {
        body.push_str(&format!("\n\nMessage from the team:\n{}", note));
    }

    message(
        NotificationKind::StaffInvitation,
        &invitation.email,
        invitation.full_name(),
        format!("Staff Invitation - {}", restaurant.name),
        body,
    )
}

pub(super) fn staff_welcome(
    user: &user::Model,
    restaurant: &restaurant::Model,
) -> NotificationMessage {
    let body = format!(
        "Hello {},\n\nWelcome to the {} team! Your {} account is ready.\n\
         Sign in with {} to get started.",
        user.first_name,
        restaurant.name,
        user.role.label(),
        user.email,
    );
    message(
        NotificationKind::StaffWelcome,
        &user.email,
        user.full_name(),
        format!("Welcome to {} Team!", restaurant.name),
        body,
    )
}

pub(super) fn role_update(
    user: &user::Model,
    old_role: Role,
    new_role: Role,
    restaurant: &restaurant::Model,
) -> NotificationMessage {
    let body = format!(
        "Hello {},\n\nYour role at {} has been changed from {} to {}.\n\
         Your permissions have been updated accordingly.",
        user.first_name,
        restaurant.name,
        old_role.label(),
        new_role.label(),
    );
    message(
        NotificationKind::RoleUpdate,
        &user.email,
        user.full_name(),
        format!("Your Role Has Been Updated at {}", restaurant.name),
        body,
    )
}

pub(super) fn admin_verification(
    user: &user::Model,
    restaurant: &restaurant::Model,
    verification_url: &str,
) -> NotificationMessage {
    let body = format!(
        "Hello {},\n\nThanks for registering {} on SnapServe.\n\
         Please confirm your email address to activate your account:\n{}\n\n\
         The link is valid for {} hours.",
        user.first_name,
        restaurant.name,
        verification_url,
        CONFIG.auth.verification_ttl_hours,
    );
    message(
        NotificationKind::AdminVerification,
        &user.email,
        user.full_name(),
        "Verify Your SnapServe Admin Account".to_string(),
        body,
    )
}

pub(super) fn admin_welcome(
    user: &user::Model,
    restaurant: &restaurant::Model,
) -> NotificationMessage {
    let body = format!(
        "Hello {},\n\nYour email is verified and {} is now active on SnapServe.\n\
         Next steps: complete your restaurant profile, set your business hours \
         and invite your staff.",
        user.first_name, restaurant.name,
    );
    message(
        NotificationKind::AdminWelcome,
        &user.email,
        user.full_name(),
        "Welcome to SnapServe! Your Restaurant is Now Active".to_string(),
        body,
    )
}
