//! Spanish/English message catalog.
//!
//! Keys are dotted, grouped by page. Templates call `locale.t("key")`;
//! handlers pass error and notice codes through query strings and resolve
//! them here with the `error.` / `notice.` prefixes.

use crate::types::Locale;

/// `(key, spanish, english)`
const MESSAGES: &[(&str, &str, &str)] = &[
    // Navigation
    ("nav.home", "Inicio", "Home"),
    ("nav.catalog", "Catálogo", "Catalog"),
    ("nav.blog", "Blog", "Blog"),
    ("nav.contact", "Contacto", "Contact"),
    ("nav.cart", "Carrito", "Cart"),
    ("nav.favorites", "Favoritos", "Favorites"),
    ("nav.account", "Mi cuenta", "My account"),
    ("nav.orders", "Mis pedidos", "My orders"),
    ("nav.login", "Iniciar sesión", "Sign in"),
    ("nav.register", "Crear cuenta", "Create account"),
    ("nav.logout", "Cerrar sesión", "Sign out"),
    ("nav.language", "English", "Español"),
    // Home
    ("home.title", "Joyería fina hecha a mano", "Handcrafted fine jewelry"),
    ("home.subtitle", "Oro, plata y piedras preciosas con diseño mexicano", "Gold, silver and gemstones with Mexican design"),
    ("home.featured", "Piezas destacadas", "Featured pieces"),
    ("home.latest_posts", "Del blog", "From the blog"),
    ("home.shop_now", "Ver catálogo", "Shop now"),
    // Market ticker
    ("market.gold", "Oro (MXN/oz)", "Gold (MXN/oz)"),
    ("market.usd", "Dólar (MXN)", "US dollar (MXN)"),
    ("market.title", "Mercado hoy", "Market today"),
    // Catalog
    ("catalog.title", "Catálogo", "Catalog"),
    ("catalog.all", "Todas", "All"),
    ("catalog.search", "Buscar", "Search"),
    ("catalog.search_placeholder", "Buscar piezas…", "Search pieces…"),
    ("catalog.sort", "Ordenar", "Sort"),
    ("catalog.sort.newest", "Más recientes", "Newest"),
    ("catalog.sort.price_asc", "Precio: menor a mayor", "Price: low to high"),
    ("catalog.sort.price_desc", "Precio: mayor a menor", "Price: high to low"),
    ("catalog.sort.name", "Nombre", "Name"),
    ("catalog.empty", "No encontramos piezas con esos filtros.", "No pieces match those filters."),
    ("catalog.previous", "Anterior", "Previous"),
    ("catalog.next", "Siguiente", "Next"),
    // Product
    ("product.add_to_cart", "Agregar al carrito", "Add to cart"),
    ("product.quantity", "Cantidad", "Quantity"),
    ("product.in_stock", "Disponible", "In stock"),
    ("product.out_of_stock", "Agotado", "Sold out"),
    ("product.material", "Material", "Material"),
    ("product.category", "Categoría", "Category"),
    ("product.favorite", "Guardar en favoritos", "Save to favorites"),
    ("product.unfavorite", "Quitar de favoritos", "Remove from favorites"),
    ("product.related", "También te puede gustar", "You may also like"),
    // Cart
    ("cart.title", "Tu carrito", "Your cart"),
    ("cart.empty", "Tu carrito está vacío.", "Your cart is empty."),
    ("cart.subtotal", "Subtotal", "Subtotal"),
    ("cart.shipping", "Envío", "Shipping"),
    ("cart.shipping_free", "Gratis", "Free"),
    ("cart.total", "Total", "Total"),
    ("cart.update", "Actualizar", "Update"),
    ("cart.remove", "Eliminar", "Remove"),
    ("cart.clear", "Vaciar carrito", "Empty cart"),
    ("cart.checkout", "Finalizar compra", "Checkout"),
    ("cart.continue", "Seguir comprando", "Continue shopping"),
    // Checkout
    ("checkout.title", "Datos de envío", "Shipping details"),
    ("checkout.name", "Nombre completo", "Full name"),
    ("checkout.email", "Correo electrónico", "Email"),
    ("checkout.phone", "Teléfono", "Phone"),
    ("checkout.address", "Dirección", "Address"),
    ("checkout.city", "Ciudad", "City"),
    ("checkout.state", "Estado", "State"),
    ("checkout.postal_code", "Código postal", "Postal code"),
    ("checkout.notes", "Notas del pedido", "Order notes"),
    ("checkout.place_order", "Confirmar pedido", "Place order"),
    ("checkout.summary", "Resumen", "Summary"),
    ("checkout.thanks", "¡Gracias por tu compra!", "Thank you for your order!"),
    ("checkout.order_number", "Número de pedido", "Order number"),
    ("checkout.confirmation_note", "Te contactaremos para coordinar el pago y la entrega.", "We will contact you to arrange payment and delivery."),
    // Auth
    ("auth.login_title", "Iniciar sesión", "Sign in"),
    ("auth.register_title", "Crear cuenta", "Create account"),
    ("auth.email", "Correo electrónico", "Email"),
    ("auth.password", "Contraseña", "Password"),
    ("auth.password_confirm", "Confirmar contraseña", "Confirm password"),
    ("auth.full_name", "Nombre completo", "Full name"),
    ("auth.submit_login", "Entrar", "Sign in"),
    ("auth.submit_register", "Registrarme", "Sign up"),
    ("auth.forgot", "¿Olvidaste tu contraseña?", "Forgot your password?"),
    ("auth.forgot_title", "Recuperar contraseña", "Reset password"),
    ("auth.forgot_submit", "Enviar enlace", "Send link"),
    ("auth.no_account", "¿No tienes cuenta?", "No account yet?"),
    ("auth.have_account", "¿Ya tienes cuenta?", "Already have an account?"),
    ("auth.confirm_title", "Confirma tu correo", "Confirm your email"),
    ("auth.confirm_email", "Revisa tu correo para confirmar tu cuenta.", "Check your email to confirm your account."),
    // Account
    ("account.title", "Mi cuenta", "My account"),
    ("account.profile", "Perfil", "Profile"),
    ("account.save", "Guardar", "Save"),
    ("account.orders", "Mis pedidos", "My orders"),
    ("account.no_orders", "Aún no tienes pedidos.", "You have no orders yet."),
    ("account.order_date", "Fecha", "Date"),
    ("account.order_status", "Estado", "Status"),
    ("account.order_total", "Total", "Total"),
    ("account.view", "Ver", "View"),
    ("account.items", "Artículos", "Items"),
    ("account.phone", "Teléfono", "Phone"),
    ("account.shipping_to", "Enviar a", "Ship to"),
    ("account.view_all", "Ver todos", "View all"),
    // Favorites
    ("favorites.title", "Mis favoritos", "My favorites"),
    ("favorites.empty", "No has guardado piezas todavía.", "You have not saved any pieces yet."),
    // Blog
    ("blog.title", "Blog", "Blog"),
    ("blog.read_more", "Leer más", "Read more"),
    ("blog.empty", "Pronto publicaremos nuevas historias.", "New stories coming soon."),
    ("blog.back", "Volver al blog", "Back to blog"),
    // Contact
    ("contact.title", "Contáctanos", "Contact us"),
    ("contact.name", "Nombre", "Name"),
    ("contact.email", "Correo electrónico", "Email"),
    ("contact.subject", "Asunto", "Subject"),
    ("contact.message", "Mensaje", "Message"),
    ("contact.send", "Enviar", "Send"),
    // Footer
    ("footer.rights", "Todos los derechos reservados.", "All rights reserved."),
    // Order statuses
    ("status.pendiente", "Pendiente", "Pending"),
    ("status.procesando", "Procesando", "Processing"),
    ("status.enviado", "Enviado", "Shipped"),
    ("status.entregado", "Entregado", "Delivered"),
    ("status.cancelado", "Cancelado", "Cancelled"),
    // Categories
    ("category.anillos", "Anillos", "Rings"),
    ("category.collares", "Collares", "Necklaces"),
    ("category.aretes", "Aretes", "Earrings"),
    ("category.pulseras", "Pulseras", "Bracelets"),
    ("category.dijes", "Dijes", "Pendants"),
    ("category.otros", "Otros", "Other"),
    // Notices
    ("notice.added_to_cart", "Agregado al carrito.", "Added to cart."),
    ("notice.profile_saved", "Perfil actualizado.", "Profile updated."),
    ("notice.message_sent", "Gracias, te responderemos pronto.", "Thanks, we will get back to you soon."),
    ("notice.recovery_sent", "Si el correo existe, enviamos un enlace de recuperación.", "If that email exists, we sent a recovery link."),
    ("notice.logged_out", "Sesión cerrada.", "Signed out."),
    // Errors
    ("error.generic", "Algo salió mal. Intenta de nuevo.", "Something went wrong. Please try again."),
    ("error.credentials", "Correo o contraseña incorrectos.", "Wrong email or password."),
    ("error.session", "No pudimos iniciar tu sesión.", "We could not start your session."),
    ("error.email_taken", "Ya existe una cuenta con ese correo.", "An account with that email already exists."),
    ("error.required", "Este campo es obligatorio.", "This field is required."),
    ("error.invalid_email", "Correo electrónico no válido.", "Invalid email address."),
    ("error.invalid_phone", "El teléfono debe tener 10 dígitos.", "Phone must have 10 digits."),
    ("error.invalid_postal_code", "El código postal debe tener 5 dígitos.", "Postal code must have 5 digits."),
    ("error.name_length", "El nombre debe tener entre 2 y 100 caracteres.", "Name must be 2 to 100 characters."),
    ("error.password_short", "La contraseña debe tener al menos 8 caracteres.", "Password must be at least 8 characters."),
    ("error.password_weak", "La contraseña debe incluir letras y números.", "Password must include letters and numbers."),
    ("error.password_mismatch", "Las contraseñas no coinciden.", "Passwords do not match."),
    ("error.message_length", "El mensaje debe tener entre 10 y 5000 caracteres.", "Message must be 10 to 5000 characters."),
    ("error.cart_empty", "Tu carrito está vacío.", "Your cart is empty."),
    ("error.cart_changed", "Algunas piezas ya no están disponibles; revisamos tu carrito.", "Some pieces are no longer available; we updated your cart."),
    ("error.out_of_stock", "No hay suficiente inventario.", "Not enough stock."),
    ("error.login_required", "Inicia sesión para continuar.", "Please sign in to continue."),
    ("error.price_invalid", "El precio debe ser mayor a cero.", "Price must be greater than zero."),
    ("error.stock_invalid", "El inventario no puede ser negativo.", "Stock cannot be negative."),
    ("error.category_invalid", "Categoría no válida.", "Invalid category."),
    ("error.slug_taken", "Ya existe una entrada con ese slug.", "A post with that slug already exists."),
    ("error.forbidden", "No tienes permiso para esta acción.", "You are not allowed to do that."),
    ("error.not_found", "No encontramos lo que buscas.", "We could not find that."),
    ("error.amount_invalid", "El monto debe ser un número mayor o igual a cero.", "Amount must be a number of zero or more."),
];

/// Look up a message for a locale.
#[must_use]
pub fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    MESSAGES
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, es, en)| match locale {
            Locale::Es => *es,
            Locale::En => *en,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_lookup_both_languages() {
        assert_eq!(lookup(Locale::Es, "nav.cart"), Some("Carrito"));
        assert_eq!(lookup(Locale::En, "nav.cart"), Some("Cart"));
    }

    #[test]
    fn test_keys_are_unique() {
        let mut seen = HashSet::new();
        for (key, _, _) in MESSAGES {
            assert!(seen.insert(*key), "duplicate message key: {key}");
        }
    }

    #[test]
    fn test_no_empty_translations() {
        for (key, es, en) in MESSAGES {
            assert!(!es.is_empty() && !en.is_empty(), "empty translation for {key}");
        }
    }
}
