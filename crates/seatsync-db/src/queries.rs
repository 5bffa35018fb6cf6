//! SQL text for the ticket queries.
//!
//! The WordPress table prefix is configuration, not a bind parameter, so the
//! statements are assembled per prefix. The prefix is validated to identifier
//! characters before it ever reaches these builders.

pub(crate) const TICKET_POST_TYPE: &str = "event_magic_tickets";

/// Ticket statuses that do not count as sold.
pub(crate) const EXCLUDED_STATUSES: &str = "'Canceled', 'Cancelled', 'Unpaid'";

pub(crate) fn is_valid_table_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Count of live tickets for `(product, slot label prefix, exact date)`.
///
/// Binds: product id, slot `LIKE` pattern, booking date.
pub(crate) fn tickets_sold_for_date(prefix: &str) -> String {
    format!(
        "SELECT COUNT(*) AS ticket_count \
         FROM {prefix}posts p \
         INNER JOIN {prefix}postmeta m1 ON p.ID = m1.post_id \
         INNER JOIN {prefix}postmeta m2 ON p.ID = m2.post_id \
         INNER JOIN {prefix}postmeta m3 ON p.ID = m3.post_id \
         LEFT JOIN {prefix}postmeta m4 ON p.ID = m4.post_id AND m4.meta_key = 'WooCommerceEventsStatus' \
         WHERE p.post_type = '{TICKET_POST_TYPE}' \
         AND p.post_status = 'publish' \
         AND m1.meta_key = 'WooCommerceEventsProductID' \
         AND m1.meta_value = ? \
         AND m2.meta_key = 'WooCommerceEventsBookingSlot' \
         AND m2.meta_value LIKE ? \
         AND m3.meta_key = 'WooCommerceEventsBookingDate' \
         AND m3.meta_value = ? \
         AND (m4.meta_value IS NULL OR m4.meta_value NOT IN ({EXCLUDED_STATUSES}))"
    )
}

/// Count of live tickets for a product regardless of slot/date tags.
///
/// Binds: product id.
pub(crate) fn total_tickets_for_product(prefix: &str) -> String {
    format!(
        "SELECT COUNT(*) AS ticket_count \
         FROM {prefix}posts p \
         INNER JOIN {prefix}postmeta m1 ON p.ID = m1.post_id \
         LEFT JOIN {prefix}postmeta m4 ON p.ID = m4.post_id AND m4.meta_key = 'WooCommerceEventsStatus' \
         WHERE p.post_type = '{TICKET_POST_TYPE}' \
         AND p.post_status = 'publish' \
         AND m1.meta_key = 'WooCommerceEventsProductID' \
         AND m1.meta_value = ? \
         AND (m4.meta_value IS NULL OR m4.meta_value NOT IN ({EXCLUDED_STATUSES}))"
    )
}

/// Count of published tickets for a product that carry a non-empty slot tag.
///
/// Binds: product id.
pub(crate) fn tickets_with_slot_metadata(prefix: &str) -> String {
    format!(
        "SELECT COUNT(*) AS tickets_with_slot \
         FROM {prefix}posts p \
         INNER JOIN {prefix}postmeta m1 ON p.ID = m1.post_id \
         INNER JOIN {prefix}postmeta m2 ON p.ID = m2.post_id \
         WHERE p.post_type = '{TICKET_POST_TYPE}' \
         AND p.post_status = 'publish' \
         AND m1.meta_key = 'WooCommerceEventsProductID' \
         AND m1.meta_value = ? \
         AND m2.meta_key = 'WooCommerceEventsBookingSlot' \
         AND m2.meta_value IS NOT NULL \
         AND m2.meta_value != ''"
    )
}

/// All ticket posts of a product with their tags, newest first.
///
/// Binds: product id.
pub(crate) fn tickets_for_product(prefix: &str) -> String {
    format!(
        "SELECT \
             p.ID AS ticket_id, \
             p.post_title, \
             p.post_date, \
             p.post_status, \
             m2.meta_value AS booking_slot, \
             m3.meta_value AS booking_date, \
             m4.meta_value AS status \
         FROM {prefix}posts p \
         INNER JOIN {prefix}postmeta m1 ON p.ID = m1.post_id \
         LEFT JOIN {prefix}postmeta m2 ON p.ID = m2.post_id AND m2.meta_key = 'WooCommerceEventsBookingSlot' \
         LEFT JOIN {prefix}postmeta m3 ON p.ID = m3.post_id AND m3.meta_key = 'WooCommerceEventsBookingDate' \
         LEFT JOIN {prefix}postmeta m4 ON p.ID = m4.post_id AND m4.meta_key = 'WooCommerceEventsStatus' \
         WHERE p.post_type = '{TICKET_POST_TYPE}' \
         AND m1.meta_key = 'WooCommerceEventsProductID' \
         AND m1.meta_value = ? \
         ORDER BY p.post_date DESC"
    )
}

/// Count of every ticket post, any status.
pub(crate) fn ticket_post_count(prefix: &str) -> String {
    format!("SELECT COUNT(*) FROM {prefix}posts WHERE post_type = '{TICKET_POST_TYPE}'")
}

/// `LIKE` pattern matching any stored slot label that starts with `label`.
///
/// The storefront stores labels with a suffix (`"8pm Show (08:00)"`) while the
/// booking configuration holds the bare label (`"8pm Show"`). Wildcards inside
/// the label itself are escaped so they match literally.
pub(crate) fn slot_prefix_pattern(label: &str) -> String {
    let mut pattern = String::with_capacity(label.len() + 1);
    for c in label.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
