//! Platform CTA button type catalogue.
//!
//! The ad platform exposes a fixed enumeration of button labels, distinct
//! from the free-text CTA copy fragment. The catalogue is kept as plain
//! strings because the platform adds values between API versions and the
//! wire format is the string itself.

use crate::error::CoreError;

/// Button type used when a combination does not constrain the CTA type axis.
pub const DEFAULT_CTA_TYPE: &str = "LEARN_MORE";

/// All button types accepted by the ad platform, as of API v21.
pub const VALID_CTA_TYPES: &[&str] = &[
    "ADD_TO_CART",
    "APPLY_NOW",
    "ASK_ABOUT_SERVICES",
    "ASK_FOR_MORE_INFO",
    "BOOK_A_CONSULTATION",
    "BOOK_NOW",
    "BOOK_TRAVEL",
    "BUY_NOW",
    "BUY_TICKETS",
    "BUY_VIA_MESSAGE",
    "CALL",
    "CALL_ME",
    "CALL_NOW",
    "CHAT_WITH_US",
    "CHECK_AVAILABILITY",
    "CIVIC_ACTION",
    "CONFIRM",
    "CONTACT_US",
    "DIAL_CODE",
    "DONATE",
    "DONATE_NOW",
    "DOWNLOAD",
    "EVENT_RSVP",
    "EXPLORE_MORE",
    "FIND_A_GROUP",
    "FIND_YOUR_GROUPS",
    "FOLLOW_NEWS_STORYLINE",
    "FOLLOW_PAGE",
    "FOLLOW_USER",
    "GET_A_QUOTE",
    "GET_DIRECTIONS",
    "GET_EVENT_TICKETS",
    "GET_IN_TOUCH",
    "GET_MOBILE_APP",
    "GET_OFFER",
    "GET_OFFER_VIEW",
    "GET_PROMOTIONS",
    "GET_QUOTE",
    "GET_SHOWTIMES",
    "GET_STARTED",
    "INQUIRE_NOW",
    "INSTAGRAM_MESSAGE",
    "INSTALL_APP",
    "INSTALL_MOBILE_APP",
    "JOIN_CHANNEL",
    "LEARN_MORE",
    "LIKE_PAGE",
    "LINK_CARD",
    "LISTEN_MUSIC",
    "LISTEN_NOW",
    "LOYALTY_LEARN_MORE",
    "MAKE_AN_APPOINTMENT",
    "MESSAGE_PAGE",
    "MISSED_CALL",
    "MOBILE_DOWNLOAD",
    "NO_BUTTON",
    "OPEN_INSTANT_APP",
    "OPEN_LINK",
    "OPEN_MESSENGER_EXT",
    "ORDER_NOW",
    "PAY_TO_ACCESS",
    "PLAY_GAME",
    "PLAY_GAME_ON_FACEBOOK",
    "PURCHASE_GIFT_CARDS",
    "RAISE_MONEY",
    "READ_MORE",
    "RECORD_NOW",
    "REFER_FRIENDS",
    "REGISTER_NOW",
    "REQUEST_QUOTE",
    "REQUEST_TIME",
    "SAVE",
    "SEARCH",
    "SEE_DETAILS",
    "SEE_MENU",
    "SEE_MORE",
    "SELL_NOW",
    "SEND_A_GIFT",
    "SEND_GIFT_MONEY",
    "SEND_MESSAGE",
    "SHARE",
    "SHOP_NOW",
    "SIGN_UP",
    "START_ORDER",
    "SUBSCRIBE",
    "SWIPE_UP_PRODUCT",
    "SWIPE_UP_SHOP",
    "TRY_IT",
    "TRY_ON",
    "UPDATE_APP",
    "USE_APP",
    "USE_MOBILE_APP",
    "VIDEO_ANNOTATION",
    "VIEW_CHANNEL",
    "VIEW_INSTAGRAM_PROFILE",
    "VIEW_PRODUCT",
    "VISIT_PAGES_FEED",
    "VISIT_WORLD",
    "VOTE_NOW",
    "WATCH_MORE",
    "WATCH_VIDEO",
    "WHATSAPP_MESSAGE",
];

/// Validate a CTA button type against the platform catalogue.
pub fn validate_cta_type(cta_type: &str) -> Result<(), CoreError> {
    // The catalogue is sorted, so binary search keeps validation O(log n).
    if VALID_CTA_TYPES.binary_search(&cta_type).is_ok() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown CTA button type '{cta_type}'"
        )))
    }
}
