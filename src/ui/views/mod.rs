pub mod resource_detail;
pub mod resource_list;

pub use resource_detail::ResourceDetail;
pub use resource_list::ResourceList;
