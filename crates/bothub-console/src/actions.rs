//! Claim actions and owner affordances derived from a bot snapshot.
//!
//! Nothing here is stored: every answer is recomputed from the bot's
//! `status`, `can_claim` and `is_owner` fields.

use bothub_client::ClaimService;
use bothub_common::models::{AvatarUploaded, Bot, BotStatus, ClaimType};
use bothub_common::{ConsoleError, ConsoleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimAction {
    ClaimAsOwner,
    Hire,
    Share,
}

impl ClaimAction {
    pub fn claim_type(self) -> ClaimType {
        match self {
            Self::ClaimAsOwner => ClaimType::Owner,
            Self::Hire => ClaimType::Hire,
            Self::Share => ClaimType::Share,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ClaimAsOwner => "Claim as owner",
            Self::Hire => "Hire",
            Self::Share => "Share",
        }
    }
}

/// Actions the viewer may take on `bot`.
///
/// Unclaimed bots only offer an ownership claim; claimed ones only offer
/// hire/share requests. Nothing is offered when the registry says the
/// viewer cannot claim.
pub fn claim_actions(bot: &Bot) -> Vec<ClaimAction> {
    if !bot.can_claim {
        return Vec::new();
    }
    match bot.status {
        BotStatus::Unclaimed => vec![ClaimAction::ClaimAsOwner],
        _ => vec![ClaimAction::Hire, ClaimAction::Share],
    }
}

/// Text of the button that opens the action menu, if there is one.
pub fn claim_button_label(bot: &Bot) -> Option<&'static str> {
    if !bot.can_claim {
        return None;
    }
    Some(if bot.status == BotStatus::Unclaimed { "Claim" } else { "Request access" })
}

pub fn can_upload_avatar(bot: &Bot) -> bool {
    bot.is_owner
}

/// Open/closed state of a bot card's action menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimMenu {
    actions: Vec<ClaimAction>,
    open: bool,
}

impl ClaimMenu {
    pub fn for_bot(bot: &Bot) -> Self {
        Self { actions: claim_actions(bot), open: false }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flip the menu. A bot without actions has no menu to open.
    pub fn toggle(&mut self) {
        self.open = !self.open && !self.actions.is_empty();
    }

    /// Options currently on screen.
    pub fn entries(&self) -> &[ClaimAction] {
        if self.open { self.actions.as_slice() } else { &[] }
    }

    /// Pick an entry; the menu closes either way.
    pub fn choose(&mut self, action: ClaimAction) -> Option<ClaimAction> {
        let picked = self.open && self.actions.contains(&action);
        self.open = false;
        picked.then_some(action)
    }
}

/// Hand a replacement avatar to the upload endpoint, for owners only.
pub async fn upload_avatar(
    service: &dyn ClaimService,
    bot: &Bot,
    file_name: &str,
    bytes: Vec<u8>,
) -> ConsoleResult<AvatarUploaded> {
    if !can_upload_avatar(bot) {
        return Err(ConsoleError::Forbidden);
    }
    tracing::info!(bot_id = %bot.bot_id, file_name, size = bytes.len(), "uploading avatar");
    service.upload_avatar(&bot.bot_id, file_name, bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClaims, bot};
    use bothub_common::models::{ClaimRequestStatus, ClaimType};

    fn with_claim(status: BotStatus, can_claim: bool) -> Bot {
        let mut b = bot("x", "X", status, None);
        b.can_claim = can_claim;
        b
    }

    #[test]
    fn unclaimed_offers_only_owner_claim() {
        assert_eq!(
            claim_actions(&with_claim(BotStatus::Unclaimed, true)),
            [ClaimAction::ClaimAsOwner]
        );
    }

    #[test]
    fn claimed_bots_offer_hire_and_share() {
        for status in [BotStatus::Online, BotStatus::Claimed, BotStatus::Busy] {
            assert_eq!(
                claim_actions(&with_claim(status, true)),
                [ClaimAction::Hire, ClaimAction::Share]
            );
        }
    }

    #[test]
    fn cannot_claim_offers_nothing() {
        assert!(claim_actions(&with_claim(BotStatus::Online, false)).is_empty());
        assert!(claim_actions(&with_claim(BotStatus::Unclaimed, false)).is_empty());
        assert_eq!(claim_button_label(&with_claim(BotStatus::Online, false)), None);
    }

    #[test]
    fn button_label_follows_status() {
        assert_eq!(claim_button_label(&with_claim(BotStatus::Unclaimed, true)), Some("Claim"));
        assert_eq!(
            claim_button_label(&with_claim(BotStatus::Offline, true)),
            Some("Request access")
        );
    }

    #[test]
    fn menu_opens_chooses_and_closes() {
        let mut menu = ClaimMenu::for_bot(&with_claim(BotStatus::Online, true));
        assert!(menu.entries().is_empty());

        menu.toggle();
        assert!(menu.is_open());
        assert_eq!(menu.entries(), [ClaimAction::Hire, ClaimAction::Share]);

        assert_eq!(menu.choose(ClaimAction::ClaimAsOwner), None);
        assert!(!menu.is_open());

        menu.toggle();
        assert_eq!(menu.choose(ClaimAction::Share), Some(ClaimAction::Share));
        assert_eq!(ClaimAction::Share.claim_type(), ClaimType::Share);
    }

    #[test]
    fn menu_without_actions_stays_closed() {
        let mut menu = ClaimMenu::for_bot(&with_claim(BotStatus::Online, false));
        menu.toggle();
        assert!(!menu.is_open());
    }

    #[tokio::test]
    async fn avatar_upload_is_owner_only() {
        let claims = FakeClaims::answering(Ok(crate::testing::receipt(
            ClaimType::Owner,
            ClaimRequestStatus::Approved,
        )));
        let mut b = bot("helper-01", "Helper", BotStatus::Online, None);

        let err = upload_avatar(&claims, &b, "me.png", vec![1, 2, 3]).await.unwrap_err();
        assert_eq!(err, ConsoleError::Forbidden);
        assert!(claims.uploads.lock().unwrap().is_empty());

        b.is_owner = true;
        let uploaded = upload_avatar(&claims, &b, "me.png", vec![1, 2, 3]).await.unwrap();
        assert!(uploaded.avatar_url.ends_with("me.png"));
        assert_eq!(
            *claims.uploads.lock().unwrap(),
            [("helper-01".to_owned(), "me.png".to_owned(), 3)]
        );
    }
}
