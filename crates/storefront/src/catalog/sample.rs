//! Bundled sample catalog, served when the content store is unreachable or
//! empty.

use ambre_core::{FragranceNotes, Price, Product, ProductId};

struct Sample {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    rupees: u32,
    stock: u32,
    notes: [&'static [&'static str]; 3],
    featured: bool,
    best_seller: bool,
    is_new: bool,
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "oud-royale",
        name: "Oud Royale",
        category: "Woody",
        description: "Smoky agarwood wrapped in saffron and aged leather.",
        rupees: 3499,
        stock: 24,
        notes: [&["Saffron", "Pink Pepper"], &["Oud", "Rose"], &["Leather", "Amber"]],
        featured: true,
        best_seller: true,
        is_new: false,
    },
    Sample {
        id: "jasmine-nights",
        name: "Jasmine Nights",
        category: "Floral",
        description: "Night-blooming jasmine over a soft sandalwood base.",
        rupees: 2499,
        stock: 40,
        notes: [&["Bergamot"], &["Jasmine Sambac", "Tuberose"], &["Sandalwood", "Musk"]],
        featured: true,
        best_seller: false,
        is_new: false,
    },
    Sample {
        id: "monsoon-vetiver",
        name: "Monsoon Vetiver",
        category: "Fresh",
        description: "Rain-soaked earth and cool vetiver roots.",
        rupees: 1999,
        stock: 35,
        notes: [&["Petrichor", "Green Mandarin"], &["Vetiver"], &["Cedarwood", "Moss"]],
        featured: false,
        best_seller: true,
        is_new: false,
    },
    Sample {
        id: "amber-saffron",
        name: "Amber Saffron",
        category: "Oriental",
        description: "Warm amber resin laced with saffron threads and vanilla.",
        rupees: 2999,
        stock: 18,
        notes: [&["Saffron", "Cardamom"], &["Labdanum"], &["Vanilla", "Benzoin"]],
        featured: true,
        best_seller: false,
        is_new: true,
    },
    Sample {
        id: "citrus-mirage",
        name: "Citrus Mirage",
        category: "Citrus",
        description: "Sun-bright bitter orange and neroli with a clean musk trail.",
        rupees: 1799,
        stock: 50,
        notes: [&["Bitter Orange", "Lemon"], &["Neroli"], &["White Musk"]],
        featured: false,
        best_seller: true,
        is_new: true,
    },
    Sample {
        id: "rose-attar",
        name: "Rose Attar",
        category: "Floral",
        description: "Damask rose distilled over a whisper of oud.",
        rupees: 2799,
        stock: 12,
        notes: [&["Lychee"], &["Damask Rose", "Geranium"], &["Oud", "Patchouli"]],
        featured: false,
        best_seller: false,
        is_new: true,
    },
    Sample {
        id: "sandalwood-silk",
        name: "Sandalwood Silk",
        category: "Woody",
        description: "Creamy Mysore sandalwood softened with iris.",
        rupees: 3199,
        stock: 0,
        notes: [&["Cardamom"], &["Iris", "Violet"], &["Sandalwood", "Tonka"]],
        featured: false,
        best_seller: false,
        is_new: false,
    },
];

/// The bundled catalog, in display order.
#[must_use]
pub fn sample_catalog() -> Vec<Product> {
    SAMPLES.iter().map(Sample::to_product).collect()
}

impl Sample {
    fn to_product(&self) -> Product {
        let [top, middle, base] = self.notes;

        Product {
            id: ProductId::new(self.id),
            name: self.name.to_owned(),
            category: self.category.to_owned(),
            description: self.description.to_owned(),
            price: Price::from_rupees(self.rupees),
            stock: self.stock,
            images: vec![format!("/images/products/{}.jpg", self.id)],
            notes: FragranceNotes {
                top: owned(top),
                middle: owned(middle),
                base: owned(base),
            },
            sizes: vec!["50ml".to_owned(), "100ml".to_owned()],
            featured: self.featured,
            best_seller: self.best_seller,
            is_new: self.is_new,
        }
    }
}

fn owned(notes: &[&str]) -> Vec<String> {
    notes.iter().map(|&note| note.to_owned()).collect()
}
