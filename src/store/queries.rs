/// Yields no row when the name is taken.
pub const INSERT_USER: &str =
    "INSERT INTO users (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id, name, joined_at";

pub const GET_USER: &str = "SELECT id, name, joined_at FROM users WHERE id = $1";

pub const INSERT_LISTING: &str = r#"
    INSERT INTO listings (owner_id, title, description, starting_price, category, image_url)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, owner_id, title, description, starting_price, category, image_url, active, created_at
"#;

pub const GET_LISTING: &str = "SELECT id, owner_id, title, description, starting_price, category, image_url, active, created_at FROM listings WHERE id = $1";

/// Row lock held for the rest of the transaction; bids and closes on the
/// same listing serialize behind it.
pub const LOCK_LISTING: &str = "SELECT id, owner_id, title, description, starting_price, category, image_url, active, created_at FROM listings WHERE id = $1 FOR UPDATE";

pub const CLOSE_LISTING: &str = r#"
    UPDATE listings SET active = FALSE
    WHERE id = $1 AND active
    RETURNING id, owner_id, title, description, starting_price, category, image_url, active, created_at
"#;

pub const GET_ALL_LISTINGS: &str =
    "SELECT id, owner_id, title, description, starting_price, category, image_url, active, created_at FROM listings ORDER BY id";

pub const GET_LISTINGS_BY_CATEGORY: &str =
    "SELECT id, owner_id, title, description, starting_price, category, image_url, active, created_at FROM listings WHERE category = $1 ORDER BY id";

pub const LISTING_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM listings WHERE id = $1)";

/// `placed_at` is the moment of the append under the row lock, not the
/// transaction start.
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (listing_id, bidder_id, amount, placed_at)
    VALUES ($1, $2, $3, clock_timestamp())
    RETURNING id, listing_id, bidder_id, amount, placed_at
"#;

pub const GET_BIDS: &str = r#"
    SELECT id, listing_id, bidder_id, amount, placed_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY placed_at, id
"#;

pub const GET_HIGHEST_BID: &str = r#"
    SELECT id, listing_id, bidder_id, amount, placed_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY amount DESC, placed_at, id
    LIMIT 1
"#;

pub const GET_CURRENT_MINIMUM: &str = r#"
    SELECT COALESCE((SELECT MAX(amount) FROM bids WHERE listing_id = l.id), l.starting_price) AS minimum
    FROM listings l
    WHERE l.id = $1
"#;

pub const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (listing_id, author_id, content)
    VALUES ($1, $2, $3)
    RETURNING id, listing_id, author_id, content, posted_at
"#;

pub const GET_COMMENTS: &str = r#"
    SELECT id, listing_id, author_id, content, posted_at
    FROM comments
    WHERE listing_id = $1
    ORDER BY posted_at, id
"#;

pub const IS_WATCHING: &str =
    "SELECT EXISTS (SELECT 1 FROM watches WHERE user_id = $1 AND listing_id = $2)";

pub const DELETE_WATCH: &str = "DELETE FROM watches WHERE user_id = $1 AND listing_id = $2";

pub const INSERT_WATCH: &str =
    "INSERT INTO watches (user_id, listing_id) VALUES ($1, $2) ON CONFLICT DO NOTHING";

pub const GET_WATCHED_LISTINGS: &str = r#"
    SELECT l.id, l.owner_id, l.title, l.description, l.starting_price, l.category, l.image_url, l.active, l.created_at
    FROM listings l
    JOIN watches w ON w.listing_id = l.id
    WHERE w.user_id = $1
    ORDER BY l.id
"#;
