/// Paginated slice of a larger result set
#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            ((total as f64) / (limit as f64)).ceil() as u32
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Cut page `page` (1-based) of size `limit` out of an already ordered list.
    pub fn from_vec(all: Vec<T>, page: u32, limit: u32) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let total = all.len() as u64;
        let skip = ((page - 1) as usize).saturating_mul(limit as usize);
        let items = all.into_iter().skip(skip).take(limit as usize).collect();
        Self::new(items, total, page, limit)
    }
}
