//! Diesel schema definitions for the catalogue database.

diesel::table! {
    /// User accounts with role-based write access.
    users (id) {
        /// Primary key.
        id -> Uuid,
        /// Unique login email, domain part stored lowercase.
        #[max_length = 128]
        email -> Varchar,
        /// Display name.
        #[max_length = 128]
        name -> Varchar,
        /// Access role, `editor` or `reader`.
        #[max_length = 16]
        role -> Varchar,
        /// Inactive accounts cannot authenticate.
        is_active -> Bool,
        /// Staff flag, informational only.
        is_staff -> Bool,
        /// Superuser flag, informational only.
        is_superuser -> Bool,
        /// PHC-format argon2 hash.
        #[max_length = 256]
        password_hash -> Varchar,
    }
}

diesel::table! {
    /// Books in the catalogue.
    books (id) {
        /// Surrogate primary key, internal only.
        id -> Int4,
        /// Public identifier exposed over the API.
        uuid -> Uuid,
        /// Book title.
        #[max_length = 128]
        title -> Varchar,
        /// Author display name.
        #[max_length = 128]
        author -> Varchar,
        /// Creation instant, set once.
        created_at -> Timestamptz,
        /// Advances on book edits and on page mutations.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered pages belonging to a book.
    pages (id) {
        /// Surrogate primary key, internal only.
        id -> Int4,
        /// Public identifier exposed over the API.
        uuid -> Uuid,
        /// Owning book; deleting the book cascades here.
        book_id -> Int4,
        /// Position within the book, unique per book, starts at 1.
        number -> Int4,
        /// Page text.
        content -> Text,
    }
}

diesel::joinable!(pages -> books (book_id));

diesel::allow_tables_to_appear_in_same_query!(books, pages);
