use anyhow::{Result, bail};
use tracing::info;

use spacedesign_types::api::NewFurniture;
use spacedesign_types::models::{FurniturePlacement, RoomLayout};

use crate::Database;
use crate::models::LayoutSave;

struct DemoItem {
    name: &'static str,
    category: &'static str,
    price: i64,
    image_url: &'static str,
    description: &'static str,
}

const DEMO_CATALOG: &[DemoItem] = &[
    DemoItem {
        name: "Modern Sectional Sofa",
        category: "Sofa",
        price: 1299,
        image_url: "https://images.unsplash.com/photo-1586023492125-27b2c045efd7?w=400",
        description: "Contemporary sectional sofa with clean lines and comfortable cushioning. \
                      Perfect for modern living rooms.",
    },
    DemoItem {
        name: "Ergonomic Office Chair",
        category: "Chair",
        price: 899,
        image_url: "https://images.unsplash.com/photo-1541558869434-2840d308329a?w=400",
        description: "Premium ergonomic office chair designed for all-day comfort and productivity.",
    },
    DemoItem {
        name: "Minimalist Dining Table",
        category: "Table",
        price: 749,
        image_url: "https://images.unsplash.com/photo-1549497538-303791108f95?w=400",
        description: "Scandinavian-inspired dining table with clean lines and sustainable wood construction.",
    },
    DemoItem {
        name: "Industrial Coffee Table",
        category: "Table",
        price: 399,
        image_url: "https://images.unsplash.com/photo-1506439773649-6e0eb8cfb237?w=400",
        description: "Industrial-style coffee table with metal frame and reclaimed wood top.",
    },
    DemoItem {
        name: "Velvet Accent Chair",
        category: "Chair",
        price: 599,
        image_url: "https://images.unsplash.com/photo-1506439773649-6e0eb8cfb237?w=400",
        description: "Luxurious velvet accent chair in emerald green with gold legs.",
    },
];

pub const DEMO_LAYOUT_ID: &str = "living-room-1";

/// Fill an empty catalog with the demo furniture, and add the demo layout if
/// no layout uses its id yet. Returns false (and touches nothing) if the
/// catalog already has items.
pub fn seed_demo(db: &Database) -> Result<bool> {
    if db.count_furniture()? > 0 {
        return Ok(false);
    }

    let mut ids = Vec::with_capacity(DEMO_CATALOG.len());
    for item in DEMO_CATALOG {
        let row = db.create_furniture(&NewFurniture {
            name: item.name.to_string(),
            category: item.category.to_string(),
            price: item.price,
            image_url: item.image_url.to_string(),
            description: item.description.to_string(),
            images: vec![item.image_url.to_string()],
        })?;
        ids.push(row.id);
    }

    if db.get_room_layout(DEMO_LAYOUT_ID)?.is_some() {
        info!("Layout '{}' already exists, leaving it alone", DEMO_LAYOUT_ID);
    } else {
        seed_demo_layout(db, &ids)?;
    }

    info!("Seeded demo catalog ({} items)", ids.len());
    Ok(true)
}

/// sofa + coffee table
fn seed_demo_layout(db: &Database, catalog: &[i64]) -> Result<()> {
    let layout = RoomLayout {
        id: DEMO_LAYOUT_ID.to_string(),
        name: "Modern Living Room".to_string(),
        furniture: vec![
            FurniturePlacement {
                furniture_id: catalog[0],
                x: 200.0,
                y: 300.0,
                z: 0.0,
                rotation: 0.0,
            },
            FurniturePlacement {
                furniture_id: catalog[3],
                x: 400.0,
                y: 350.0,
                z: 0.0,
                rotation: 45.0,
            },
        ],
    };

    if let LayoutSave::UnknownFurniture(missing) = db.save_room_layout(&layout)? {
        bail!("demo layout references furniture {:?} missing from the demo catalog", missing);
    }
    info!("Seeded demo layout '{}'", DEMO_LAYOUT_ID);
    Ok(())
}
