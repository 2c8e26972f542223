//! In-memory port implementations and fixtures for handler tests.
//!
//! The adapters reproduce the persistence contract faithfully, including
//! timestamp propagation, cascade deletion, and uniqueness checks, so the
//! handler tests exercise the same behaviour the Diesel adapters provide.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    BookPersistenceError, BookRepository, PasswordHasher, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Actor, Book, BookChanges, BookDraft, EmailAddress, Error, NewUser, Page, PageChanges,
    PageContent, PageDraft, PageNumber, Role, User, UserChanges, UserName,
};
use crate::outbound::PasswordLoginService;

use super::auth::JwtCodec;
use super::state::HttpState;

#[derive(Default)]
struct BooksInner {
    books: Vec<Book>,
    pages: Vec<Page>,
}

/// In-memory [`BookRepository`].
#[derive(Default)]
pub struct InMemoryBooks {
    inner: Mutex<BooksInner>,
}

impl InMemoryBooks {
    fn lock(&self) -> std::sync::MutexGuard<'_, BooksInner> {
        self.inner.lock().expect("book store poisoned")
    }
}

#[async_trait]
impl BookRepository for InMemoryBooks {
    async fn create_book(
        &self,
        draft: BookDraft,
        now: DateTime<Utc>,
    ) -> Result<Book, BookPersistenceError> {
        let book = Book::new(draft, now);
        self.lock().books.push(book.clone());
        Ok(book)
    }

    async fn update_book(
        &self,
        uuid: Uuid,
        changes: BookChanges,
        now: DateTime<Utc>,
    ) -> Result<Book, BookPersistenceError> {
        let mut inner = self.lock();
        let book = inner
            .books
            .iter_mut()
            .find(|book| book.uuid() == uuid)
            .ok_or_else(BookPersistenceError::book_not_found)?;
        if !changes.is_empty() {
            book.apply(changes, now);
        }
        Ok(book.clone())
    }

    async fn delete_book(&self, uuid: Uuid) -> Result<(), BookPersistenceError> {
        let mut inner = self.lock();
        let before = inner.books.len();
        inner.books.retain(|book| book.uuid() != uuid);
        if inner.books.len() == before {
            return Err(BookPersistenceError::book_not_found());
        }
        inner.pages.retain(|page| page.book_uuid() != uuid);
        Ok(())
    }

    async fn find_book(&self, uuid: Uuid) -> Result<Book, BookPersistenceError> {
        self.lock()
            .books
            .iter()
            .find(|book| book.uuid() == uuid)
            .cloned()
            .ok_or_else(BookPersistenceError::book_not_found)
    }

    async fn list_books(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Book>, u64), BookPersistenceError> {
        let inner = self.lock();
        // Newest first; ties keep the most recently inserted book first,
        // matching the database tie-break.
        let mut books: Vec<Book> = inner.books.iter().rev().cloned().collect();
        books.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        let total = books.len() as u64;
        let offset = usize::try_from(offset).expect("offset fits in usize");
        let limit = usize::try_from(limit).expect("limit fits in usize");
        Ok((books.into_iter().skip(offset).take(limit).collect(), total))
    }

    async fn create_page(
        &self,
        book_uuid: Uuid,
        draft: PageDraft,
        now: DateTime<Utc>,
    ) -> Result<Page, BookPersistenceError> {
        let mut inner = self.lock();
        if !inner.books.iter().any(|book| book.uuid() == book_uuid) {
            return Err(BookPersistenceError::book_not_found());
        }
        if inner
            .pages
            .iter()
            .any(|page| page.book_uuid() == book_uuid && page.number() == draft.number)
        {
            return Err(BookPersistenceError::duplicate_page_number());
        }
        let page = Page::new(book_uuid, draft);
        inner.pages.push(page.clone());
        if let Some(book) = inner.books.iter_mut().find(|book| book.uuid() == book_uuid) {
            book.touch(now);
        }
        Ok(page)
    }

    async fn update_page(
        &self,
        uuid: Uuid,
        changes: PageChanges,
        now: DateTime<Utc>,
    ) -> Result<Page, BookPersistenceError> {
        let mut inner = self.lock();
        let current = inner
            .pages
            .iter()
            .find(|page| page.uuid() == uuid)
            .cloned()
            .ok_or_else(BookPersistenceError::page_not_found)?;
        if changes.is_empty() {
            return Ok(current);
        }
        if let Some(number) = changes.number {
            let taken = inner.pages.iter().any(|page| {
                page.book_uuid() == current.book_uuid()
                    && page.number() == number
                    && page.uuid() != uuid
            });
            if taken {
                return Err(BookPersistenceError::duplicate_page_number());
            }
        }
        let book_uuid = current.book_uuid();
        let page = inner
            .pages
            .iter_mut()
            .find(|page| page.uuid() == uuid)
            .ok_or_else(BookPersistenceError::page_not_found)?;
        page.apply(changes);
        let page = page.clone();
        if let Some(book) = inner.books.iter_mut().find(|book| book.uuid() == book_uuid) {
            book.touch(now);
        }
        Ok(page)
    }

    async fn delete_page(
        &self,
        uuid: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), BookPersistenceError> {
        let mut inner = self.lock();
        let book_uuid = inner
            .pages
            .iter()
            .find(|page| page.uuid() == uuid)
            .map(Page::book_uuid)
            .ok_or_else(BookPersistenceError::page_not_found)?;
        inner.pages.retain(|page| page.uuid() != uuid);
        if let Some(book) = inner.books.iter_mut().find(|book| book.uuid() == book_uuid) {
            book.touch(now);
        }
        Ok(())
    }

    async fn find_page(&self, uuid: Uuid) -> Result<Page, BookPersistenceError> {
        self.lock()
            .pages
            .iter()
            .find(|page| page.uuid() == uuid)
            .cloned()
            .ok_or_else(BookPersistenceError::page_not_found)
    }

    async fn list_pages(
        &self,
        book_uuid: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Page>, u64), BookPersistenceError> {
        let inner = self.lock();
        let mut pages: Vec<Page> = inner
            .pages
            .iter()
            .filter(|page| page.book_uuid() == book_uuid)
            .cloned()
            .collect();
        pages.sort_by_key(Page::number);
        let total = pages.len() as u64;
        let offset = usize::try_from(offset).expect("offset fits in usize");
        let limit = usize::try_from(limit).expect("limit fits in usize");
        Ok((pages.into_iter().skip(offset).take(limit).collect(), total))
    }
}

/// In-memory [`UserRepository`].
#[derive(Default)]
pub struct InMemoryUsers {
    inner: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        self.inner.lock().expect("user store poisoned")
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, draft: NewUser) -> Result<User, UserPersistenceError> {
        let mut users = self.lock();
        if users.iter().any(|user| user.email() == &draft.email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        let user = User::from_parts(Uuid::new_v4(), draft);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().iter().find(|user| user.email() == email).cloned())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, UserPersistenceError> {
        let mut users = self.lock();
        let current = users
            .iter()
            .find(|user| user.id() == id)
            .cloned()
            .ok_or_else(UserPersistenceError::not_found)?;
        let email = changes.email.unwrap_or_else(|| current.email().clone());
        if users
            .iter()
            .any(|user| user.email() == &email && user.id() != id)
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        let draft = NewUser {
            email,
            name: changes.name.unwrap_or_else(|| current.name().clone()),
            role: current.role(),
            is_staff: current.is_staff(),
            is_superuser: current.is_superuser(),
            password_hash: changes
                .password_hash
                .unwrap_or_else(|| current.password_hash().to_owned()),
        };
        let updated = User::from_parts(id, draft).with_active(current.is_active());
        if let Some(slot) = users.iter_mut().find(|user| user.id() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), UserPersistenceError> {
        let mut users = self.lock();
        let before = users.len();
        users.retain(|user| user.id() != id);
        if users.len() == before {
            return Err(UserPersistenceError::not_found());
        }
        Ok(())
    }
}

/// Deterministic hasher so tests never pay the argon2 cost.
pub struct StubHasher;

impl StubHasher {
    fn encode(password: &str) -> String {
        format!("stub:{password}")
    }
}

impl PasswordHasher for StubHasher {
    fn hash(&self, password: &str) -> Result<String, Error> {
        Ok(Self::encode(password))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        Self::encode(password) == hash
    }
}

/// Everything a handler test needs: state, codec, and seeding helpers.
pub struct TestContext {
    books: Arc<InMemoryBooks>,
    users: Arc<InMemoryUsers>,
    state: HttpState,
    codec: JwtCodec,
}

/// Build a context with empty stores and a fixed test secret.
pub fn test_context() -> TestContext {
    let books = Arc::new(InMemoryBooks::default());
    let users = Arc::new(InMemoryUsers::default());
    let hasher = Arc::new(StubHasher);
    let login = Arc::new(PasswordLoginService::new(users.clone(), hasher.clone()));
    let state = HttpState::new(books.clone(), users.clone(), login, hasher);
    let codec = JwtCodec::new(b"test-secret", Duration::hours(1));
    TestContext {
        books,
        users,
        state,
        codec,
    }
}

impl TestContext {
    pub fn state(&self) -> HttpState {
        self.state.clone()
    }

    pub fn codec(&self) -> JwtCodec {
        self.codec.clone()
    }

    pub async fn seed_book(&self, title: &str, author: &str) -> Book {
        let draft = BookDraft {
            title: crate::domain::Title::new(title).expect("title"),
            author: crate::domain::AuthorName::new(author).expect("author"),
        };
        self.books
            .create_book(draft, Utc::now())
            .await
            .expect("seed book")
    }

    pub async fn seed_page(&self, book_uuid: Uuid, number: i64, content: &str) -> Page {
        let draft = PageDraft {
            number: PageNumber::new(number).expect("number"),
            content: PageContent::new(content).expect("content"),
        };
        self.books
            .create_page(book_uuid, draft, Utc::now())
            .await
            .expect("seed page")
    }

    pub async fn book(&self, uuid: Uuid) -> Book {
        self.books.find_book(uuid).await.expect("book exists")
    }

    pub async fn seed_user(&self, email: &str, password: &str, role: Role) -> User {
        let email = EmailAddress::new(email).expect("email");
        let name = UserName::new("Test User").expect("name");
        let hash = StubHasher::encode(password);
        let draft = match role {
            Role::Editor => NewUser::editor(email, name, hash),
            Role::Reader => NewUser::reader(email, name, hash),
        };
        self.users.create(draft).await.expect("seed user")
    }

    pub fn token_for(&self, user: &User) -> String {
        let actor = Actor {
            id: user.id(),
            role: user.role(),
        };
        self.codec
            .issue(actor, Utc::now())
            .expect("token for seeded user")
    }

    pub async fn editor_token(&self) -> String {
        let user = self
            .seed_user("editor@example.com", "testpass", Role::Editor)
            .await;
        self.token_for(&user)
    }

    pub async fn reader_token(&self) -> String {
        let user = self
            .seed_user("reader@example.com", "testpass", Role::Reader)
            .await;
        self.token_for(&user)
    }
}
