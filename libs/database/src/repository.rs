//! Thin generic wrapper over the sea-orm calls every table repository repeats.

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PrimaryKeyTrait,
};

type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Primary-key CRUD for a single entity `E`.
///
/// Queries beyond these (filters, joins, ordering) go through [`BaseRepository::db`].
pub struct BaseRepository<E: EntityTrait> {
    db: DatabaseConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> Clone for BaseRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

impl<E: EntityTrait> BaseRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn find_by_id<K>(&self, id: K) -> Result<Option<E::Model>, DbErr>
    where
        K: Into<PrimaryKeyOf<E>>,
    {
        E::find_by_id(id).one(&self.db).await
    }

    pub async fn insert<A>(&self, model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.insert(&self.db).await
    }

    pub async fn update<A>(&self, model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.update(&self.db).await
    }

    /// Returns the number of rows removed, so callers can tell a miss from a hit.
    pub async fn delete_by_id<K>(&self, id: K) -> Result<u64, DbErr>
    where
        K: Into<PrimaryKeyOf<E>>,
    {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
