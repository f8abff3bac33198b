pub mod address;
pub mod company;
pub mod invoice;
pub mod invoice_item;
pub mod office;
pub mod order;
pub mod order_item;
pub mod order_item_stock;
pub mod order_note;
pub mod order_payment;
pub mod paper_product;
pub mod permission;
pub mod role;
pub mod role_permission;
pub mod shipping_info;
pub mod status_transition;
pub mod typesetting;
pub mod typesetting_option;
pub mod typesetting_proof;
pub mod typesetting_proof_artwork;
pub mod user;
pub mod user_role;
pub mod work_order;
pub mod work_order_item;
pub mod work_order_item_stock;
pub mod work_order_note;
