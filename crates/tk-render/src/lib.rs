pub mod bounds;
pub mod drawable;
pub mod handle;
pub mod hit;

pub use bounds::{box_transform, element_transform, frame_box, local_rect, position_for_box};
pub use drawable::{Drawable, Stroke, drawable, scene_drawables, wrap_words};
pub use handle::{Anchor, anchor_positions, hit_test_handle, resize_box, rotate_box};
pub use hit::hit_test;
